//! Main content router: menu identifier -> content route.
//!
//! # Invariants
//! - `resolve_route` is total: unknown, forbidden or dashboard ids all land
//!   on the caller's default dashboard.
//! - Fallbacks emit a `warn` event with metadata only.

use crate::model::role::Role;
use crate::navigation::dashboard::{default_dashboard, DashboardView};
use crate::navigation::menu::{is_menu_visible, MenuId};
use log::warn;
use serde::Serialize;

/// Content area target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum Route {
    Dashboard(DashboardView),
    Page(MenuId),
}

impl Route {
    /// Stable string form: `dashboard:<view>` or `page:<menu id>`.
    pub fn key(self) -> String {
        match self {
            Self::Dashboard(view) => format!("dashboard:{}", view.as_str()),
            Self::Page(id) => format!("page:{}", id.as_str()),
        }
    }
}

/// Reason a route request fell back to the default dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteFallback {
    UnknownMenuId,
    Forbidden,
}

impl RouteFallback {
    fn as_str(self) -> &'static str {
        match self {
            Self::UnknownMenuId => "unknown_menu_id",
            Self::Forbidden => "forbidden",
        }
    }
}

/// Resolves a menu identifier for `role`.
pub fn resolve_route(menu_id: &str, role: Role) -> Route {
    match try_resolve_route(menu_id, role) {
        Ok(route) => route,
        Err(reason) => {
            let fallback = default_dashboard(role);
            warn!(
                "event=route_resolve module=navigation status=fallback reason={} role={} fallback={}",
                reason.as_str(),
                role,
                fallback
            );
            Route::Dashboard(fallback)
        }
    }
}

/// Resolves a menu identifier against a raw role string.
pub fn resolve_route_for(menu_id: &str, role: &str) -> Route {
    resolve_route(menu_id, Role::from_str_or_default(role))
}

/// Like [`resolve_route`] but reports why a fallback would happen.
pub fn try_resolve_route(menu_id: &str, role: Role) -> Result<Route, RouteFallback> {
    let id = MenuId::parse(menu_id.trim()).ok_or(RouteFallback::UnknownMenuId)?;
    if id == MenuId::Dashboard {
        return Ok(Route::Dashboard(default_dashboard(role)));
    }
    if !is_menu_visible(id, role) {
        return Err(RouteFallback::Forbidden);
    }
    Ok(Route::Page(id))
}

#[cfg(test)]
mod tests {
    use super::{resolve_route, resolve_route_for, try_resolve_route, Route, RouteFallback};
    use crate::model::role::Role;
    use crate::navigation::dashboard::{default_dashboard, DashboardView};
    use crate::navigation::menu::MenuId;

    #[test]
    fn unknown_ids_fall_back_to_default_dashboard_for_every_role() {
        for role in Role::ALL {
            for raw in ["", "nope", "DASHBOARD", "goals/../users", "team goals"] {
                assert_eq!(
                    resolve_route(raw, role),
                    Route::Dashboard(default_dashboard(role)),
                    "role {role} id {raw:?}"
                );
            }
        }
    }

    #[test]
    fn known_ids_route_to_pages_when_permitted() {
        assert_eq!(
            resolve_route("team-goals", Role::Teamlead),
            Route::Page(MenuId::TeamGoals)
        );
        assert_eq!(
            resolve_route("dashboard", Role::Manager),
            Route::Dashboard(DashboardView::Team)
        );
    }

    #[test]
    fn forbidden_ids_fall_back_without_error() {
        assert_eq!(
            try_resolve_route("users", Role::Employee),
            Err(RouteFallback::Forbidden)
        );
        assert_eq!(
            resolve_route("users", Role::Employee),
            Route::Dashboard(DashboardView::Personal)
        );
        assert_eq!(
            resolve_route_for("settings", "bogus-role"),
            Route::Dashboard(DashboardView::Personal)
        );
    }

    #[test]
    fn route_keys_are_stable() {
        assert_eq!(Route::Page(MenuId::MyGoals).key(), "page:my-goals");
        assert_eq!(
            Route::Dashboard(DashboardView::Organization).key(),
            "dashboard:organization"
        );
    }
}
