//! Domain model for the performance management core.
//!
//! # Responsibility
//! - Define canonical records for users, masters, goals, reviews and jobs.
//! - Own field-level validation shared by repositories and services.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - Enum values persist as stable snake_case (or upper-case role) strings.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod bulk;
pub mod goal;
pub mod master;
pub mod review;
pub mod role;
pub mod user;

/// Field-level validation failure for any domain record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is empty after trimming.
    MissingField(&'static str),
    /// Field has a value outside its accepted shape or range.
    InvalidField {
        field: &'static str,
        message: String,
    },
}

impl ValidationError {
    pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            message: message.into(),
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "{field} is required"),
            Self::InvalidField { field, message } => write!(f, "{field} is invalid: {message}"),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

/// Normalizes one free-form tag: trimmed, lowercase, `None` when empty.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Normalizes, deduplicates and sorts tag values.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let unique: std::collections::BTreeSet<String> =
        tags.iter().filter_map(|tag| normalize_tag(tag)).collect();
    unique.into_iter().collect()
}
