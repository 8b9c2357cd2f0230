//! FRB bindings crate for the PMS core.

pub mod api;
