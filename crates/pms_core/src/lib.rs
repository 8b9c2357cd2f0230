//! Core domain logic for the PMS front-end.
//! This crate is the single source of truth for role routing, session and
//! performance-management invariants.

pub mod analytics;
pub mod auth;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod navigation;
pub mod repo;
pub mod seed;
pub mod service;

pub use auth::credentials::{CredentialVerifier, DemoCredentialVerifier, DEMO_PASSWORD};
pub use auth::monitor::SessionMonitor;
pub use auth::store::{AuthRecord, AuthSettings, AuthStore, SessionCheck, SessionUser};
pub use auth::{AuthError, AuthResult};
pub use config::{AppConfig, ConfigError};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::role::Role;
pub use navigation::dashboard::{default_dashboard, default_dashboard_for, DashboardView};
pub use navigation::menu::{menu_for_role, MenuId, MenuItem};
pub use navigation::router::{resolve_route, Route};
pub use repo::{RepoError, RepoResult};
pub use service::{Actor, ServiceError, ServiceResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
