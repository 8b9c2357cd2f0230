use pms_core::auth::credentials::demo_account_for_role;
use pms_core::db::{now_epoch_ms, open_db_in_memory};
use pms_core::model::goal::{GoalCategory, GoalPriority, GoalStatus};
use pms_core::model::review::ReviewStatus;
use pms_core::repo::goal_repo::{GoalListQuery, SqliteGoalRepository};
use pms_core::repo::review_repo::SqliteReviewRepository;
use pms_core::repo::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use pms_core::seed::seed_demo_data;
use pms_core::service::goal_service::{
    GoalService, NewEvidenceRequest, NewGoalRequest, NewTemplateRequest,
};
use pms_core::service::review_service::ReviewService;
use pms_core::{Actor, Role, ServiceError};
use rusqlite::Connection;
use uuid::Uuid;

fn seeded() -> Connection {
    let conn = open_db_in_memory().unwrap();
    seed_demo_data(&conn).unwrap();
    conn
}

fn actor(role: Role) -> Actor {
    Actor::new(demo_account_for_role(role).user_id(), role)
}

fn goal_request(owner_id: Uuid, title: &str) -> NewGoalRequest {
    NewGoalRequest {
        owner_id,
        title: title.to_string(),
        description: String::new(),
        category: GoalCategory::Performance,
        priority: GoalPriority::High,
        due_date: None,
        tags: vec!["Q1".to_string(), " q1 ".to_string(), "Sales".to_string()],
    }
}

#[test]
fn employees_own_their_goals_and_leads_may_assign() {
    let conn = seeded();
    let service = GoalService::new(SqliteGoalRepository::new(&conn));
    let employee = actor(Role::Employee);

    let own = service
        .create_goal(&employee, goal_request(employee.id, "Close 10 deals"))
        .unwrap();
    assert_eq!(own.tags, vec!["q1".to_string(), "sales".to_string()]);
    assert_eq!(own.status, GoalStatus::NotStarted);

    let assigned = service
        .create_goal(&actor(Role::Teamlead), goal_request(employee.id, "Mentor intern"))
        .unwrap();
    assert_eq!(assigned.owner_id, employee.id);

    let err = service
        .create_goal(&employee, goal_request(actor(Role::Manager).id, "Not mine"))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden { role: Role::Employee, .. }));

    let err = service
        .create_goal(&employee, goal_request(employee.id, "   "))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[test]
fn progress_drives_status_and_persists() {
    let conn = seeded();
    let service = GoalService::new(SqliteGoalRepository::new(&conn));
    let employee = actor(Role::Employee);
    let goal = service
        .create_goal(&employee, goal_request(employee.id, "Ship feature"))
        .unwrap();

    let started = service.update_progress(&employee, goal.uuid, 30).unwrap();
    assert_eq!(started.status, GoalStatus::InProgress);

    let done = service.update_progress(&employee, goal.uuid, 100).unwrap();
    assert_eq!(done.status, GoalStatus::Completed);
    assert_eq!(service.get_goal(goal.uuid).unwrap().status, GoalStatus::Completed);

    let reset = service.update_progress(&employee, goal.uuid, 0).unwrap();
    assert_eq!(reset.status, GoalStatus::NotStarted);

    let err = service.update_progress(&employee, goal.uuid, 101).unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let cancelled = service
        .update_status(&employee, goal.uuid, GoalStatus::Cancelled)
        .unwrap();
    assert_eq!(cancelled.status, GoalStatus::Cancelled);
    assert!(service.update_progress(&employee, goal.uuid, 10).is_err());

}

#[test]
fn overdue_refresh_only_touches_open_past_due_goals() {
    let conn = seeded();
    let service = GoalService::new(SqliteGoalRepository::new(&conn));
    let employee = actor(Role::Employee);
    let now = now_epoch_ms();

    let mut late = goal_request(employee.id, "Late");
    late.due_date = Some(now - 86_400_000);
    let late = service.create_goal(&employee, late).unwrap();

    let mut finished = goal_request(employee.id, "Finished");
    finished.due_date = Some(now - 86_400_000);
    let finished = service.create_goal(&employee, finished).unwrap();
    service.update_progress(&employee, finished.uuid, 100).unwrap();

    let mut future = goal_request(employee.id, "Future");
    future.due_date = Some(now + 86_400_000);
    service.create_goal(&employee, future).unwrap();

    assert_eq!(service.refresh_overdue(&[employee.id], now).unwrap(), 1);
    assert_eq!(service.get_goal(late.uuid).unwrap().status, GoalStatus::Overdue);
    assert_eq!(service.refresh_overdue(&[employee.id], now).unwrap(), 0);

    let overdue = service
        .list_goals(&GoalListQuery {
            status: Some(GoalStatus::Overdue),
            ..GoalListQuery::default()
        })
        .unwrap();
    assert_eq!(overdue.len(), 1);
}

#[test]
fn goal_listing_and_overdue_sweep_cover_more_than_one_page() {
    let conn = seeded();
    let service = GoalService::new(SqliteGoalRepository::new(&conn));
    let employee = actor(Role::Employee);
    let due = now_epoch_ms() - 86_400_000;
    let total = MAX_PAGE_LIMIT as usize + 50;

    for index in 0..total {
        let mut request = goal_request(employee.id, &format!("Backlog item {index:03}"));
        request.due_date = Some(due);
        service.create_goal(&employee, request).unwrap();
    }

    assert_eq!(service.goals_for_owner(employee.id).unwrap().len(), total);
    assert_eq!(
        service
            .list_all_goals(&GoalListQuery::default())
            .unwrap()
            .len(),
        total
    );
    assert_eq!(
        service
            .list_goals(&GoalListQuery::default())
            .unwrap()
            .len(),
        DEFAULT_PAGE_LIMIT as usize
    );

    assert_eq!(
        service.refresh_overdue(&[employee.id], now_epoch_ms()).unwrap(),
        total
    );
    let still_open = service
        .list_all_goals(&GoalListQuery {
            status: Some(GoalStatus::NotStarted),
            ..GoalListQuery::default()
        })
        .unwrap();
    assert!(still_open.is_empty());
}

#[test]
fn goal_visibility_follows_ownership_and_rank() {
    let conn = seeded();
    let service = GoalService::new(SqliteGoalRepository::new(&conn));
    let employee = actor(Role::Employee);
    service
        .create_goal(&employee, goal_request(employee.id, "Write docs"))
        .unwrap();

    assert_eq!(service.goals_visible_to(&employee, employee.id).unwrap().len(), 1);
    assert_eq!(
        service
            .goals_visible_to(&actor(Role::Teamlead), employee.id)
            .unwrap()
            .len(),
        1
    );
    let err = service
        .goals_visible_to(&employee, actor(Role::Manager).id)
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden { role: Role::Employee, .. }));
}

#[test]
fn templates_are_manager_only_and_instantiate_into_goals() {
    let conn = seeded();
    let service = GoalService::new(SqliteGoalRepository::new(&conn));
    let request = || NewTemplateRequest {
        name: "Quarterly learning".to_string(),
        description: "Complete one course".to_string(),
        category: GoalCategory::Learning,
        default_priority: GoalPriority::Low,
        tags: vec!["Growth".to_string()],
    };

    let err = service
        .create_template(&actor(Role::Teamlead), request())
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden { .. }));

    let template = service
        .create_template(&actor(Role::Manager), request())
        .unwrap();
    assert_eq!(service.list_templates().unwrap().len(), 1);

    let employee = actor(Role::Employee);
    let goal = service
        .instantiate_template(&employee, template.uuid, employee.id)
        .unwrap();
    assert_eq!(goal.template_id, Some(template.uuid));
    assert_eq!(goal.priority, GoalPriority::Low);
    assert_eq!(goal.tags, vec!["growth".to_string()]);

    let by_tag = service
        .list_goals(&GoalListQuery {
            tag: Some("growth".to_string()),
            ..GoalListQuery::default()
        })
        .unwrap();
    assert_eq!(by_tag.len(), 1);
}

#[test]
fn evidence_requires_an_http_link_and_an_existing_goal() {
    let conn = seeded();
    let service = GoalService::new(SqliteGoalRepository::new(&conn));
    let employee = actor(Role::Employee);
    let goal = service
        .create_goal(&employee, goal_request(employee.id, "Publish talk"))
        .unwrap();

    let evidence = service
        .add_evidence(
            &employee,
            goal.uuid,
            NewEvidenceRequest {
                title: "Slides".to_string(),
                description: String::new(),
                link: Some(" https://example.com/slides ".to_string()),
            },
        )
        .unwrap();
    assert_eq!(evidence.link.as_deref(), Some("https://example.com/slides"));
    assert!(evidence.created_at > 0);

    let bad_link = service.add_evidence(
        &employee,
        goal.uuid,
        NewEvidenceRequest {
            title: "Recording".to_string(),
            description: String::new(),
            link: Some("ftp://example.com/rec".to_string()),
        },
    );
    assert!(matches!(bad_link, Err(ServiceError::Validation(_))));

    let missing = service.add_evidence(
        &employee,
        Uuid::new_v4(),
        NewEvidenceRequest {
            title: "Nothing".to_string(),
            description: String::new(),
            link: None,
        },
    );
    assert!(matches!(missing, Err(ServiceError::NotFound { .. })));
    assert_eq!(service.list_evidence(goal.uuid).unwrap().len(), 1);

    service.delete_goal(&employee, goal.uuid).unwrap();
    assert!(service.list_evidence(goal.uuid).unwrap().is_empty());
}

#[test]
fn review_workflow_runs_from_draft_to_completed() {
    let conn = seeded();
    let service = ReviewService::new(SqliteReviewRepository::new(&conn));
    let lead = actor(Role::Teamlead);
    let employee = actor(Role::Employee);

    let draft = service.create_draft(&lead, employee.id, "2024-Q1").unwrap();
    assert_eq!(draft.status, ReviewStatus::Draft);

    let duplicate = service.create_draft(&lead, employee.id, "2024-Q1");
    assert!(matches!(duplicate, Err(ServiceError::Duplicate { .. })));

    let out_of_range = service.submit_self(&employee, draft.uuid, 6, "great");
    assert!(matches!(out_of_range, Err(ServiceError::Validation(_))));
    let premature = service.submit_manager(&lead, draft.uuid, 4, "");
    assert!(matches!(premature, Err(ServiceError::InvalidTransition(_))));

    let submitted = service
        .submit_self(&employee, draft.uuid, 4, "  Hit every target  ")
        .unwrap();
    assert_eq!(submitted.status, ReviewStatus::SelfSubmitted);
    assert_eq!(submitted.self_comment.as_deref(), Some("Hit every target"));

    let wrong_reviewer = service.submit_manager(&actor(Role::Manager), draft.uuid, 5, "");
    assert!(matches!(wrong_reviewer, Err(ServiceError::Forbidden { .. })));

    let reviewed = service.submit_manager(&lead, draft.uuid, 5, "").unwrap();
    assert_eq!(reviewed.status, ReviewStatus::ManagerReviewed);
    assert_eq!(reviewed.manager_comment, None);

    let late_return = service.return_to_draft(&lead, draft.uuid);
    assert!(matches!(late_return, Err(ServiceError::InvalidTransition(_))));

    let completed = service.complete(&actor(Role::Hr), draft.uuid).unwrap();
    assert_eq!(completed.status, ReviewStatus::Completed);

    let visible = service.list_visible(&employee, Some("2024-Q1")).unwrap();
    assert_eq!(visible.len(), 1);
    assert!(service.list_visible(&actor(Role::Manager), None).unwrap().is_empty());
}

#[test]
fn review_gates_reject_employees_and_self_reviews() {
    let conn = seeded();
    let service = ReviewService::new(SqliteReviewRepository::new(&conn));
    let lead = actor(Role::Teamlead);
    let employee = actor(Role::Employee);

    let err = service
        .create_draft(&employee, lead.id, "2024-Q2")
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden { .. }));

    let err = service.create_draft(&lead, lead.id, "2024-Q2").unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let draft = service.create_draft(&lead, employee.id, "2024-Q2").unwrap();
    service.submit_self(&employee, draft.uuid, 3, "").unwrap();
    let returned = service.return_to_draft(&lead, draft.uuid).unwrap();
    assert_eq!(returned.status, ReviewStatus::Draft);
    assert_eq!(returned.self_rating, None);

    let counts = service.status_counts(Some("2024-Q2")).unwrap();
    assert_eq!(counts[0], (ReviewStatus::Draft, 1));
}

#[test]
fn returning_a_review_clears_the_self_review() {
    let conn = seeded();
    let service = ReviewService::new(SqliteReviewRepository::new(&conn));
    let lead = actor(Role::Teamlead);
    let employee = actor(Role::Employee);

    let draft = service.create_draft(&lead, employee.id, "2024-Q3").unwrap();
    service
        .submit_self(&employee, draft.uuid, 4, "Shipped the rewrite")
        .unwrap();

    let returned = service.return_to_draft(&lead, draft.uuid).unwrap();
    assert_eq!(returned.status, ReviewStatus::Draft);
    assert_eq!(returned.self_rating, None);
    assert_eq!(returned.self_comment, None);

    let stored = service.get_review(draft.uuid).unwrap();
    assert_eq!(stored.self_rating, None);
    assert_eq!(stored.self_comment, None);

    let resubmitted = service.submit_self(&employee, draft.uuid, 5, "").unwrap();
    assert_eq!(resubmitted.status, ReviewStatus::SelfSubmitted);
    assert_eq!(resubmitted.self_rating, Some(5));
}

#[test]
fn review_listings_cover_more_than_one_page() {
    let conn = seeded();
    let service = ReviewService::new(SqliteReviewRepository::new(&conn));
    let lead = actor(Role::Teamlead);
    let employee = actor(Role::Employee);
    let total = MAX_PAGE_LIMIT as usize + 10;

    for index in 0..total {
        service
            .create_draft(&lead, employee.id, &format!("C-{index:03}"))
            .unwrap();
    }

    assert_eq!(service.list_visible(&employee, None).unwrap().len(), total);
    assert_eq!(service.list_visible(&actor(Role::Hr), None).unwrap().len(), total);
    let counts = service.status_counts(None).unwrap();
    assert_eq!(counts[0], (ReviewStatus::Draft, total));
}
