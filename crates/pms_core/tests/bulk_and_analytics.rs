use pms_core::analytics::{build_report, dashboard_summary, role_distribution, ReportKind};
use pms_core::auth::credentials::demo_account_for_role;
use pms_core::db::open_db_in_memory;
use pms_core::model::bulk::{BulkOperationKind, BulkOperationStatus};
use pms_core::model::goal::{GoalCategory, GoalPriority};
use pms_core::repo::bulk_repo::SqliteBulkOperationRepository;
use pms_core::repo::goal_repo::{GoalListQuery, SqliteGoalRepository};
use pms_core::repo::user_repo::{SqliteUserRepository, UserListQuery, UserRepository};
use pms_core::seed::seed_demo_data;
use pms_core::service::bulk_service::{BulkOperationService, FixedTicker, RandomTicker};
use pms_core::service::goal_service::{GoalService, NewGoalRequest};
use pms_core::{Actor, DashboardView, Role, ServiceError};
use rusqlite::Connection;

fn seeded() -> Connection {
    let conn = open_db_in_memory().unwrap();
    seed_demo_data(&conn).unwrap();
    conn
}

fn actor(role: Role) -> Actor {
    Actor::new(demo_account_for_role(role).user_id(), role)
}

#[test]
fn fixed_ticks_advance_and_complete_a_job() {
    let conn = seeded();
    let service = BulkOperationService::new(SqliteBulkOperationRepository::new(&conn));
    let job = service
        .start(&actor(Role::Hr), BulkOperationKind::ImportUsers, 200)
        .unwrap();
    assert_eq!(job.status, BulkOperationStatus::Pending);

    let mut ticker = FixedTicker(40);
    let first = service.tick(job.uuid, &mut ticker).unwrap();
    assert_eq!(first.status, BulkOperationStatus::Running);
    assert_eq!(first.processed_items, 80);

    service.tick(job.uuid, &mut ticker).unwrap();
    let last = service.tick(job.uuid, &mut ticker).unwrap();
    assert_eq!(last.progress, 100);
    assert_eq!(last.processed_items, 200);
    assert_eq!(last.status, BulkOperationStatus::Completed);

    let after = service.tick(job.uuid, &mut ticker).unwrap();
    assert_eq!(after, last);
    assert_eq!(service.get(job.uuid).unwrap(), last);
}

#[test]
fn random_ticks_eventually_complete() {
    let conn = seeded();
    let service = BulkOperationService::new(SqliteBulkOperationRepository::new(&conn));
    let job = service
        .start(&actor(Role::Admin), BulkOperationKind::SendReminders, 37)
        .unwrap();

    let done = service
        .run_to_completion(job.uuid, &mut RandomTicker)
        .unwrap();
    assert_eq!(done.status, BulkOperationStatus::Completed);
    assert_eq!(done.processed_items, 37);
}

#[test]
fn cancelled_jobs_stop_and_only_people_ops_run_jobs() {
    let conn = seeded();
    let service = BulkOperationService::new(SqliteBulkOperationRepository::new(&conn));

    let err = service
        .start(&actor(Role::Manager), BulkOperationKind::ExportReport, 10)
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden { .. }));

    let hr = actor(Role::Hr);
    let job = service
        .start(&hr, BulkOperationKind::AssignGoals, 10)
        .unwrap();
    service.tick(job.uuid, &mut FixedTicker(10)).unwrap();

    let cancelled = service.cancel(&hr, job.uuid).unwrap();
    assert_eq!(cancelled.status, BulkOperationStatus::Cancelled);
    let ticked = service.tick(job.uuid, &mut FixedTicker(50)).unwrap();
    assert_eq!(ticked.progress, 10);

    let stalled = service
        .start(&hr, BulkOperationKind::AssignGoals, 10)
        .unwrap();
    let stuck = service
        .run_to_completion(stalled.uuid, &mut FixedTicker(0))
        .unwrap();
    assert_eq!(stuck.progress, 0);
    assert_eq!(stuck.status, BulkOperationStatus::Pending);

    assert_eq!(service.list(None).unwrap().len(), 2);
}

#[test]
fn dashboard_summary_scopes_by_view() {
    let conn = seeded();
    let goals = GoalService::new(SqliteGoalRepository::new(&conn));
    for role in [Role::Employee, Role::Teamlead, Role::Manager] {
        let owner = actor(role);
        let goal = goals
            .create_goal(
                &owner,
                NewGoalRequest {
                    owner_id: owner.id,
                    title: format!("{role} goal"),
                    description: String::new(),
                    category: GoalCategory::Performance,
                    priority: GoalPriority::Medium,
                    due_date: None,
                    tags: Vec::new(),
                },
            )
            .unwrap();
        if role == Role::Employee {
            goals.update_progress(&owner, goal.uuid, 100).unwrap();
        }
    }

    let users = SqliteUserRepository::new(&conn)
        .list_users(&UserListQuery::default())
        .unwrap();
    let all_goals = goals.list_goals(&GoalListQuery::default()).unwrap();
    let lead = actor(Role::Teamlead);

    let personal = dashboard_summary(DashboardView::Personal, lead.id, &users, &all_goals, &[]);
    assert_eq!(personal.goals.total, 1);
    assert_eq!(personal.headcount, 1);

    let team = dashboard_summary(DashboardView::Team, lead.id, &users, &all_goals, &[]);
    assert_eq!(team.goals.total, 2);
    assert_eq!(team.goals.completed, 1);
    assert_eq!(team.goals.completion_rate, 50.0);

    let org = dashboard_summary(DashboardView::Organization, lead.id, &users, &all_goals, &[]);
    assert_eq!(org.headcount, 5);
    assert_eq!(org.goals.total, 3);

    assert!(role_distribution(&users).iter().all(|(_, count)| *count == 1));

    let report = build_report(ReportKind::GoalProgress, &users, &all_goals, &[]);
    assert_eq!(report.rows.len(), 3);
    assert!(report.rows.iter().any(|row| row[0] == "Emery Lane"));
}
