//! Flat tabular reports.

use crate::analytics::stats::{department_breakdown, role_distribution};
use crate::model::goal::Goal;
use crate::model::review::Review;
use crate::model::user::{User, UserId};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    GoalProgress,
    ReviewStatus,
    Headcount,
}

impl ReportKind {
    pub const ALL: [ReportKind; 3] = [Self::GoalProgress, Self::ReviewStatus, Self::Headcount];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::GoalProgress => "goal_progress",
            Self::ReviewStatus => "review_status",
            Self::Headcount => "headcount",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(normalized))
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::GoalProgress => "Goal Progress",
            Self::ReviewStatus => "Review Status",
            Self::Headcount => "Headcount",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub kind: ReportKind,
    pub title: String,
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl Report {
    /// Renders the report as CSV. Cells containing `,`, `"` or newlines are quoted.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        push_csv_line(&mut out, self.columns.iter().copied());
        for row in &self.rows {
            push_csv_line(&mut out, row.iter().map(String::as_str));
        }
        out
    }
}

/// Builds one report. Rows keep input order; unknown user ids render as the raw id.
pub fn build_report(
    kind: ReportKind,
    users: &[User],
    goals: &[Goal],
    reviews: &[Review],
) -> Report {
    let names: HashMap<UserId, &str> = users
        .iter()
        .map(|user| (user.uuid, user.name.as_str()))
        .collect();
    let name_of = |id: &UserId| {
        names
            .get(id)
            .map_or_else(|| id.to_string(), |name| (*name).to_string())
    };

    let (columns, rows) = match kind {
        ReportKind::GoalProgress => (
            vec!["Owner", "Goal", "Category", "Status", "Progress"],
            goals
                .iter()
                .map(|goal| {
                    vec![
                        name_of(&goal.owner_id),
                        goal.title.clone(),
                        goal.category.as_str().to_string(),
                        goal.status.as_str().to_string(),
                        format!("{}%", goal.progress),
                    ]
                })
                .collect(),
        ),
        ReportKind::ReviewStatus => (
            vec!["Employee", "Reviewer", "Cycle", "Status", "Manager Rating"],
            reviews
                .iter()
                .map(|review| {
                    vec![
                        name_of(&review.employee_id),
                        name_of(&review.reviewer_id),
                        review.cycle.clone(),
                        review.status.as_str().to_string(),
                        review
                            .manager_rating
                            .map_or_else(String::new, |rating| rating.to_string()),
                    ]
                })
                .collect(),
        ),
        ReportKind::Headcount => {
            let mut rows: Vec<Vec<String>> = department_breakdown(users)
                .into_iter()
                .map(|(department, count)| {
                    vec!["department".to_string(), department, count.to_string()]
                })
                .collect();
            rows.extend(role_distribution(users).into_iter().map(|(role, count)| {
                vec!["role".to_string(), role.as_str().to_string(), count.to_string()]
            }));
            (vec!["Dimension", "Value", "Headcount"], rows)
        }
    };

    Report {
        kind,
        title: kind.title().to_string(),
        columns,
        rows,
    }
}

fn push_csv_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    for (index, cell) in cells.enumerate() {
        if index > 0 {
            out.push(',');
        }
        if cell.contains([',', '"', '\n']) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push('\n');
}
