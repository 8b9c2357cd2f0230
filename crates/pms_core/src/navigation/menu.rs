//! Static menu configuration and role filtering.
//!
//! # Invariants
//! - `MenuId` is the closed set of identifiers; its string form is stable.
//! - Filtering is recursive: an item is kept only when its own `roles`
//!   contain the role, and children are filtered the same way.
//! - The configuration is built once and never mutated.

use crate::model::role::Role;
use once_cell::sync::Lazy;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "&'static str")]
pub enum MenuId {
    Dashboard,
    Goals,
    MyGoals,
    TeamGoals,
    GoalTemplates,
    Reviews,
    MyReviews,
    TeamReviews,
    ReviewCycles,
    Masters,
    Departments,
    Domains,
    Projects,
    Users,
    BulkOperations,
    Reports,
    Analytics,
    Profile,
    Settings,
}

impl MenuId {
    pub const ALL: [MenuId; 19] = [
        Self::Dashboard,
        Self::Goals,
        Self::MyGoals,
        Self::TeamGoals,
        Self::GoalTemplates,
        Self::Reviews,
        Self::MyReviews,
        Self::TeamReviews,
        Self::ReviewCycles,
        Self::Masters,
        Self::Departments,
        Self::Domains,
        Self::Projects,
        Self::Users,
        Self::BulkOperations,
        Self::Reports,
        Self::Analytics,
        Self::Profile,
        Self::Settings,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Goals => "goals",
            Self::MyGoals => "my-goals",
            Self::TeamGoals => "team-goals",
            Self::GoalTemplates => "goal-templates",
            Self::Reviews => "reviews",
            Self::MyReviews => "my-reviews",
            Self::TeamReviews => "team-reviews",
            Self::ReviewCycles => "review-cycles",
            Self::Masters => "masters",
            Self::Departments => "departments",
            Self::Domains => "domains",
            Self::Projects => "projects",
            Self::Users => "users",
            Self::BulkOperations => "bulk-operations",
            Self::Reports => "reports",
            Self::Analytics => "analytics",
            Self::Profile => "profile",
            Self::Settings => "settings",
        }
    }

    /// Exact match on the stable identifier.
    pub fn parse(value: &str) -> Option<MenuId> {
        Self::ALL.into_iter().find(|id| id.as_str() == value)
    }
}

impl From<MenuId> for &'static str {
    fn from(value: MenuId) -> Self {
        value.as_str()
    }
}

/// One node of the navigation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub id: MenuId,
    pub label: &'static str,
    pub icon: &'static str,
    pub roles: &'static [Role],
    pub children: Vec<MenuItem>,
}

impl MenuItem {
    fn leaf(id: MenuId, label: &'static str, icon: &'static str, roles: &'static [Role]) -> Self {
        Self {
            id,
            label,
            icon,
            roles,
            children: Vec::new(),
        }
    }

    fn group(
        id: MenuId,
        label: &'static str,
        icon: &'static str,
        roles: &'static [Role],
        children: Vec<MenuItem>,
    ) -> Self {
        Self {
            id,
            label,
            icon,
            roles,
            children,
        }
    }

    pub fn allows(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

const EVERYONE: &[Role] = &Role::ALL;
const LEADS_AND_UP: &[Role] = &[Role::Admin, Role::Hr, Role::Manager, Role::Teamlead];
const MANAGERS_AND_UP: &[Role] = &[Role::Admin, Role::Hr, Role::Manager];
const PEOPLE_OPS: &[Role] = &[Role::Admin, Role::Hr];
const ADMIN_ONLY: &[Role] = &[Role::Admin];

static MENU_CONFIG: Lazy<Vec<MenuItem>> = Lazy::new(|| {
    use MenuId as M;

    vec![
        MenuItem::leaf(M::Dashboard, "Dashboard", "layout-dashboard", EVERYONE),
        MenuItem::group(
            M::Goals,
            "Goals",
            "target",
            EVERYONE,
            vec![
                MenuItem::leaf(M::MyGoals, "My Goals", "user-check", EVERYONE),
                MenuItem::leaf(M::TeamGoals, "Team Goals", "users", LEADS_AND_UP),
                MenuItem::leaf(
                    M::GoalTemplates,
                    "Goal Templates",
                    "copy",
                    MANAGERS_AND_UP,
                ),
            ],
        ),
        MenuItem::group(
            M::Reviews,
            "Reviews",
            "clipboard-check",
            EVERYONE,
            vec![
                MenuItem::leaf(M::MyReviews, "My Reviews", "file-text", EVERYONE),
                MenuItem::leaf(M::TeamReviews, "Team Reviews", "users", LEADS_AND_UP),
                MenuItem::leaf(M::ReviewCycles, "Review Cycles", "calendar", PEOPLE_OPS),
            ],
        ),
        MenuItem::group(
            M::Masters,
            "Masters",
            "database",
            PEOPLE_OPS,
            vec![
                MenuItem::leaf(M::Departments, "Departments", "building", PEOPLE_OPS),
                MenuItem::leaf(M::Domains, "Domains", "globe", PEOPLE_OPS),
                MenuItem::leaf(M::Projects, "Projects", "folder", PEOPLE_OPS),
            ],
        ),
        MenuItem::leaf(M::Users, "User Management", "user-cog", PEOPLE_OPS),
        MenuItem::leaf(M::BulkOperations, "Bulk Operations", "layers", PEOPLE_OPS),
        MenuItem::leaf(M::Reports, "Reports", "file-bar-chart", MANAGERS_AND_UP),
        MenuItem::leaf(M::Analytics, "Analytics", "bar-chart-3", LEADS_AND_UP),
        MenuItem::leaf(M::Profile, "Profile", "user", EVERYONE),
        MenuItem::leaf(M::Settings, "Settings", "settings", ADMIN_ONLY),
    ]
});

/// The full, unfiltered menu configuration.
pub fn menu_config() -> &'static [MenuItem] {
    MENU_CONFIG.as_slice()
}

/// Keeps only the items `role` may see, recursively.
pub fn filter_menu(items: &[MenuItem], role: Role) -> Vec<MenuItem> {
    items
        .iter()
        .filter(|item| item.allows(role))
        .map(|item| MenuItem {
            id: item.id,
            label: item.label,
            icon: item.icon,
            roles: item.roles,
            children: filter_menu(&item.children, role),
        })
        .collect()
}

/// Filtered navigation tree for `role`.
pub fn menu_for_role(role: Role) -> Vec<MenuItem> {
    filter_menu(menu_config(), role)
}

/// Filtered navigation tree for a raw role string (unknown -> `EMPLOYEE`).
pub fn menu_for_role_str(role: &str) -> Vec<MenuItem> {
    menu_for_role(Role::from_str_or_default(role))
}

/// Depth-first lookup in the static configuration.
pub fn find_menu_item(id: MenuId) -> Option<&'static MenuItem> {
    find_in(menu_config(), id)
}

fn find_in(items: &[MenuItem], id: MenuId) -> Option<&MenuItem> {
    items.iter().find_map(|item| {
        if item.id == id {
            Some(item)
        } else {
            find_in(&item.children, id)
        }
    })
}

/// Whether `id` is reachable for `role` through the filtered tree.
pub fn is_menu_visible(id: MenuId, role: Role) -> bool {
    find_in(&menu_for_role(role), id).is_some()
}

#[cfg(test)]
mod tests {
    use super::{
        filter_menu, find_menu_item, is_menu_visible, menu_config, menu_for_role,
        menu_for_role_str, MenuId, MenuItem,
    };
    use crate::model::role::Role;

    fn collect_ids(items: &[MenuItem], out: &mut Vec<MenuId>) {
        for item in items {
            out.push(item.id);
            collect_ids(&item.children, out);
        }
    }

    #[test]
    fn filtered_tree_never_contains_disallowed_items() {
        fn assert_allowed(items: &[MenuItem], role: Role) {
            for item in items {
                assert!(item.roles.contains(&role), "{:?} leaked to {role}", item.id);
                assert_allowed(&item.children, role);
            }
        }
        for role in Role::ALL {
            assert_allowed(&menu_for_role(role), role);
        }
    }

    #[test]
    fn configuration_covers_every_menu_id_once() {
        let mut ids = Vec::new();
        collect_ids(menu_config(), &mut ids);
        assert_eq!(ids.len(), MenuId::ALL.len());
        for id in MenuId::ALL {
            assert!(ids.contains(&id), "{id:?} missing from configuration");
            assert_eq!(MenuId::parse(id.as_str()), Some(id));
        }
    }

    #[test]
    fn employee_sees_only_personal_entries() {
        let mut ids = Vec::new();
        collect_ids(&menu_for_role(Role::Employee), &mut ids);
        assert_eq!(
            ids,
            vec![
                MenuId::Dashboard,
                MenuId::Goals,
                MenuId::MyGoals,
                MenuId::Reviews,
                MenuId::MyReviews,
                MenuId::Profile,
            ]
        );
    }

    #[test]
    fn admin_sees_everything() {
        let mut ids = Vec::new();
        collect_ids(&menu_for_role(Role::Admin), &mut ids);
        assert_eq!(ids.len(), MenuId::ALL.len());
    }

    #[test]
    fn submenus_are_filtered_recursively() {
        let custom = vec![MenuItem {
            id: MenuId::Goals,
            label: "Goals",
            icon: "target",
            roles: &[Role::Teamlead, Role::Employee],
            children: vec![
                MenuItem {
                    id: MenuId::MyGoals,
                    label: "Mine",
                    icon: "user",
                    roles: &[Role::Employee],
                    children: Vec::new(),
                },
                MenuItem {
                    id: MenuId::TeamGoals,
                    label: "Team",
                    icon: "users",
                    roles: &[Role::Teamlead],
                    children: Vec::new(),
                },
            ],
        }];

        let lead = filter_menu(&custom, Role::Teamlead);
        assert_eq!(lead.len(), 1);
        assert_eq!(lead[0].children.len(), 1);
        assert_eq!(lead[0].children[0].id, MenuId::TeamGoals);

        assert!(filter_menu(&custom, Role::Hr).is_empty());
    }

    #[test]
    fn lookup_and_visibility() {
        let item = find_menu_item(MenuId::Projects).expect("projects configured");
        assert_eq!(item.label, "Projects");
        assert!(is_menu_visible(MenuId::Projects, Role::Hr));
        assert!(!is_menu_visible(MenuId::Projects, Role::Manager));
        assert_eq!(menu_for_role_str("nobody"), menu_for_role(Role::Employee));
    }

    #[test]
    fn menu_id_serializes_as_stable_string() {
        let json = serde_json::to_string(&MenuId::BulkOperations).expect("serialize");
        assert_eq!(json, "\"bulk-operations\"");
    }
}
