//! Role -> default dashboard resolver.

use crate::model::role::Role;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardView {
    Personal,
    Team,
    Organization,
}

impl DashboardView {
    pub const ALL: [DashboardView; 3] = [Self::Personal, Self::Team, Self::Organization];

    /// Stable view identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Team => "team",
            Self::Organization => "organization",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim();
        Self::ALL
            .into_iter()
            .find(|view| view.as_str().eq_ignore_ascii_case(normalized))
    }
}

impl Display for DashboardView {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const DEFAULT_DASHBOARDS: [(Role, DashboardView); 5] = [
    (Role::Admin, DashboardView::Organization),
    (Role::Hr, DashboardView::Organization),
    (Role::Manager, DashboardView::Team),
    (Role::Teamlead, DashboardView::Team),
    (Role::Employee, DashboardView::Personal),
];

/// Returns the landing dashboard for `role`.
pub fn default_dashboard(role: Role) -> DashboardView {
    DEFAULT_DASHBOARDS
        .iter()
        .find(|(candidate, _)| *candidate == role)
        .map_or(DashboardView::Personal, |(_, view)| *view)
}

/// Resolves the landing dashboard from a raw role string.
///
/// Unknown roles land on the personal dashboard.
pub fn default_dashboard_for(role: &str) -> DashboardView {
    default_dashboard(Role::from_str_or_default(role))
}

/// Dashboards a role may switch between, narrowest first.
pub fn available_dashboards(role: Role) -> &'static [DashboardView] {
    match role {
        Role::Admin | Role::Hr => &DashboardView::ALL,
        Role::Manager | Role::Teamlead => &[DashboardView::Personal, DashboardView::Team],
        Role::Employee => &[DashboardView::Personal],
    }
}

/// Whether `role` may open `view`.
pub fn can_view(role: Role, view: DashboardView) -> bool {
    available_dashboards(role).contains(&view)
}

#[cfg(test)]
mod tests {
    use super::{
        available_dashboards, can_view, default_dashboard, default_dashboard_for, DashboardView,
    };
    use crate::model::role::Role;

    #[test]
    fn every_role_maps_to_exactly_one_view() {
        let expected = [
            (Role::Admin, DashboardView::Organization),
            (Role::Hr, DashboardView::Organization),
            (Role::Manager, DashboardView::Team),
            (Role::Teamlead, DashboardView::Team),
            (Role::Employee, DashboardView::Personal),
        ];
        for (role, view) in expected {
            assert_eq!(default_dashboard(role), view, "role {role}");
            assert!(DashboardView::ALL.contains(&default_dashboard(role)));
        }
    }

    #[test]
    fn unknown_role_string_lands_on_personal() {
        assert_eq!(default_dashboard_for("CEO"), DashboardView::Personal);
        assert_eq!(default_dashboard_for(""), DashboardView::Personal);
        assert_eq!(default_dashboard_for("manager"), DashboardView::Team);
    }

    #[test]
    fn default_view_is_always_available() {
        for role in Role::ALL {
            assert!(can_view(role, default_dashboard(role)));
        }
        assert!(!can_view(Role::Employee, DashboardView::Team));
        assert_eq!(available_dashboards(Role::Admin).len(), 3);
    }
}
