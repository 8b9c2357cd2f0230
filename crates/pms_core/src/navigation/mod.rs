//! Role-gated navigation: default dashboards, menu tree and content routing.
//!
//! # Responsibility
//! - Resolve the landing dashboard for a role.
//! - Filter the static menu configuration by role.
//! - Map opaque menu identifiers to content routes.
//!
//! # Invariants
//! - Every function here is pure and total: unknown roles and menu ids fall
//!   back to the least-privileged/default view and never return errors.

pub mod dashboard;
pub mod menu;
pub mod router;
