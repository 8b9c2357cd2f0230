//! Aggregations behind the dashboard cards.

use crate::model::goal::{Goal, GoalStatus};
use crate::model::review::{Review, ReviewStatus};
use crate::model::role::Role;
use crate::model::user::{User, UserId};
use crate::navigation::dashboard::DashboardView;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Bucket for users without a department.
pub const UNASSIGNED_DEPARTMENT: &str = "Unassigned";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GoalStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub not_started: usize,
    pub overdue: usize,
    pub cancelled: usize,
    /// Mean progress in percent.
    pub average_progress: f64,
    /// Completed share of all goals in percent.
    pub completion_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReviewStats {
    pub total: usize,
    pub draft: usize,
    pub self_submitted: usize,
    pub manager_reviewed: usize,
    pub completed: usize,
    /// Mean manager rating over rated reviews; `None` when nothing is rated.
    pub average_manager_rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub view: DashboardView,
    /// People in scope, the viewer included.
    pub headcount: usize,
    pub goals: GoalStats,
    pub reviews: ReviewStats,
}

pub fn goal_stats<'a>(goals: impl IntoIterator<Item = &'a Goal>) -> GoalStats {
    let mut stats = GoalStats::default();
    let mut progress_sum = 0u64;
    for goal in goals {
        stats.total += 1;
        progress_sum += u64::from(goal.progress);
        match goal.status {
            GoalStatus::Completed => stats.completed += 1,
            GoalStatus::InProgress => stats.in_progress += 1,
            GoalStatus::NotStarted => stats.not_started += 1,
            GoalStatus::Overdue => stats.overdue += 1,
            GoalStatus::Cancelled => stats.cancelled += 1,
        }
    }
    if stats.total > 0 {
        let total = stats.total as f64;
        stats.average_progress = progress_sum as f64 / total;
        stats.completion_rate = stats.completed as f64 * 100.0 / total;
    }
    stats
}

pub fn review_stats<'a>(reviews: impl IntoIterator<Item = &'a Review>) -> ReviewStats {
    let mut stats = ReviewStats::default();
    let mut rating_sum = 0u32;
    let mut rated = 0u32;
    for review in reviews {
        stats.total += 1;
        match review.status {
            ReviewStatus::Draft => stats.draft += 1,
            ReviewStatus::SelfSubmitted => stats.self_submitted += 1,
            ReviewStatus::ManagerReviewed => stats.manager_reviewed += 1,
            ReviewStatus::Completed => stats.completed += 1,
        }
        if let Some(rating) = review.manager_rating {
            rating_sum += u32::from(rating);
            rated += 1;
        }
    }
    stats.average_manager_rating = (rated > 0).then(|| f64::from(rating_sum) / f64::from(rated));
    stats
}

/// Active headcount per department, ordered by department name.
pub fn department_breakdown(users: &[User]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for user in users.iter().filter(|user| user.is_active) {
        let department = user
            .department
            .as_deref()
            .unwrap_or(UNASSIGNED_DEPARTMENT)
            .to_string();
        *counts.entry(department).or_default() += 1;
    }
    counts.into_iter().collect()
}

/// Active headcount per role, in [`Role::ALL`] order, zero counts included.
pub fn role_distribution(users: &[User]) -> Vec<(Role, usize)> {
    Role::ALL
        .iter()
        .map(|role| {
            let count = users
                .iter()
                .filter(|user| user.is_active && user.role == *role)
                .count();
            (*role, count)
        })
        .collect()
}

/// Scopes users, goals and reviews to `view` as seen by `viewer`.
///
/// - `Personal`: the viewer's own goals and reviews.
/// - `Team`: the viewer and their direct reports.
/// - `Organization`: everything.
pub fn dashboard_summary(
    view: DashboardView,
    viewer: UserId,
    users: &[User],
    goals: &[Goal],
    reviews: &[Review],
) -> DashboardSummary {
    let scope: Option<HashSet<UserId>> = match view {
        DashboardView::Personal => Some(HashSet::from([viewer])),
        DashboardView::Team => Some(
            users
                .iter()
                .filter(|user| user.is_active && user.manager_id == Some(viewer))
                .map(|user| user.uuid)
                .chain(std::iter::once(viewer))
                .collect(),
        ),
        DashboardView::Organization => None,
    };
    let in_scope = |id: &UserId| scope.as_ref().map_or(true, |ids| ids.contains(id));

    let headcount = match &scope {
        Some(ids) => ids.len(),
        None => users.iter().filter(|user| user.is_active).count(),
    };

    DashboardSummary {
        view,
        headcount,
        goals: goal_stats(goals.iter().filter(|goal| in_scope(&goal.owner_id))),
        reviews: review_stats(reviews.iter().filter(|review| in_scope(&review.employee_id))),
    }
}

#[cfg(test)]
mod tests {
    use super::{dashboard_summary, department_breakdown, goal_stats, review_stats};
    use crate::model::goal::{Goal, GoalCategory};
    use crate::model::review::{Review, ReviewStatus};
    use crate::model::role::Role;
    use crate::model::user::User;
    use crate::navigation::dashboard::DashboardView;

    fn goal_at(owner: uuid::Uuid, progress: u8) -> Goal {
        let mut goal = Goal::new(owner, "Ship it", GoalCategory::Project);
        goal.apply_progress(progress).expect("valid progress");
        goal
    }

    #[test]
    fn empty_input_yields_zeroes() {
        let goals: Vec<Goal> = Vec::new();
        let reviews: Vec<Review> = Vec::new();
        let stats = goal_stats(&goals);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.average_progress, 0.0);
        assert_eq!(stats.completion_rate, 0.0);
        assert_eq!(review_stats(&reviews).average_manager_rating, None);
    }

    #[test]
    fn goal_stats_counts_and_averages() {
        let owner = uuid::Uuid::new_v4();
        let goals = [
            goal_at(owner, 0),
            goal_at(owner, 50),
            goal_at(owner, 100),
            goal_at(owner, 50),
        ];
        let stats = goal_stats(&goals);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.in_progress, 2);
        assert_eq!(stats.not_started, 1);
        assert_eq!(stats.average_progress, 50.0);
        assert_eq!(stats.completion_rate, 25.0);
    }

    #[test]
    fn review_average_ignores_unrated() {
        let (a, b) = (uuid::Uuid::new_v4(), uuid::Uuid::new_v4());
        let mut rated = Review::new(a, b, "2024-Q1");
        rated.status = ReviewStatus::ManagerReviewed;
        rated.manager_rating = Some(4);
        let unrated = Review::new(b, a, "2024-Q1");
        let stats = review_stats(&[rated, unrated]);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.draft, 1);
        assert_eq!(stats.average_manager_rating, Some(4.0));
    }

    #[test]
    fn team_scope_covers_direct_reports_only() {
        let lead = User::new("E1", "Lead", "lead@company.com", Role::Teamlead);
        let mut report = User::new("E2", "Report", "report@company.com", Role::Employee);
        report.manager_id = Some(lead.uuid);
        let outsider = User::new("E3", "Other", "other@company.com", Role::Employee);

        let goals = [
            goal_at(lead.uuid, 10),
            goal_at(report.uuid, 100),
            goal_at(outsider.uuid, 100),
        ];
        let users = [lead.clone(), report, outsider];

        let team = dashboard_summary(DashboardView::Team, lead.uuid, &users, &goals, &[]);
        assert_eq!(team.headcount, 2);
        assert_eq!(team.goals.total, 2);

        let personal = dashboard_summary(DashboardView::Personal, lead.uuid, &users, &goals, &[]);
        assert_eq!(personal.goals.total, 1);

        let org = dashboard_summary(DashboardView::Organization, lead.uuid, &users, &goals, &[]);
        assert_eq!(org.headcount, 3);
        assert_eq!(org.goals.completed, 2);
    }

    #[test]
    fn team_scope_skips_deactivated_reports() {
        let lead = User::new("E1", "Lead", "lead@company.com", Role::Teamlead);
        let mut active = User::new("E2", "Active", "active@company.com", Role::Employee);
        active.manager_id = Some(lead.uuid);
        let mut former = User::new("E3", "Former", "former@company.com", Role::Employee);
        former.manager_id = Some(lead.uuid);
        former.is_active = false;

        let goals = [goal_at(active.uuid, 50), goal_at(former.uuid, 100)];
        let users = [lead.clone(), active, former];

        let team = dashboard_summary(DashboardView::Team, lead.uuid, &users, &goals, &[]);
        assert_eq!(team.headcount, 2);
        assert_eq!(team.goals.total, 1);
        assert_eq!(team.goals.completed, 0);

        let org = dashboard_summary(DashboardView::Organization, lead.uuid, &users, &goals, &[]);
        assert_eq!(org.headcount, 2);
    }

    #[test]
    fn department_breakdown_buckets_missing_departments() {
        let mut eng = User::new("E1", "A", "a@company.com", Role::Employee);
        eng.department = Some("Engineering".to_string());
        let none = User::new("E2", "B", "b@company.com", Role::Employee);
        let mut inactive = User::new("E3", "C", "c@company.com", Role::Employee);
        inactive.department = Some("Engineering".to_string());
        inactive.is_active = false;

        assert_eq!(
            department_breakdown(&[eng, none, inactive]),
            vec![("Engineering".to_string(), 1), ("Unassigned".to_string(), 1)]
        );
    }
}
