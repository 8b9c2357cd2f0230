//! Dashboard statistics and tabular reports.
//!
//! # Responsibility
//! - Aggregate users, goals and reviews into dashboard cards.
//! - Build flat reports suitable for export.
//!
//! # Invariants
//! - Everything here is pure; callers load the data.
//! - Empty input yields zeroed statistics, never NaN.

pub mod report;
pub mod stats;

pub use report::{build_report, Report, ReportKind};
pub use stats::{
    dashboard_summary, department_breakdown, goal_stats, review_stats, role_distribution,
    DashboardSummary, GoalStats, ReviewStats,
};
