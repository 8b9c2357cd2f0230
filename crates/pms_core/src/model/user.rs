//! User model.
//!
//! # Invariants
//! - `employee_id`, `name` and `email` are required.
//! - `email` has a single `@` with non-empty local and domain parts.
//! - Department/domain/project/manager references are informational strings;
//!   nothing enforces that they point at existing records.

use crate::model::role::Role;
use crate::model::{require_text, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uuid: UserId,
    pub employee_id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub department: Option<String>,
    pub domain: Option<String>,
    pub project: Option<String>,
    pub manager_id: Option<UserId>,
    pub is_active: bool,
}

impl User {
    /// Creates an active user with a generated id and no org references.
    pub fn new(
        employee_id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            employee_id: employee_id.into(),
            name: name.into(),
            email: email.into(),
            role,
            department: None,
            domain: None,
            project: None,
            manager_id: None,
            is_active: true,
        }
    }

    /// Validates required fields and email shape.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("employee_id", &self.employee_id)?;
        require_text("name", &self.name)?;
        require_text("email", &self.email)?;
        if !is_valid_email(&self.email) {
            return Err(ValidationError::invalid(
                "email",
                "expected local@domain.tld",
            ));
        }
        if self.manager_id == Some(self.uuid) {
            return Err(ValidationError::invalid(
                "manager_id",
                "user cannot manage themselves",
            ));
        }
        Ok(())
    }

    /// Short initials used by avatars, e.g. `Jane Doe` -> `JD`.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

/// Returns whether `value` looks like an email address.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value.trim())
}

#[cfg(test)]
mod tests {
    use super::{is_valid_email, User};
    use crate::model::role::Role;
    use crate::model::ValidationError;

    #[test]
    fn validate_requires_core_fields() {
        let user = User::new("", "Jane", "jane@company.com", Role::Employee);
        assert_eq!(
            user.validate(),
            Err(ValidationError::MissingField("employee_id"))
        );

        let user = User::new("E-1", "Jane", "jane-at-company", Role::Employee);
        assert!(matches!(
            user.validate(),
            Err(ValidationError::InvalidField { field: "email", .. })
        ));
    }

    #[test]
    fn self_management_is_rejected() {
        let mut user = User::new("E-1", "Jane", "jane@company.com", Role::Manager);
        user.manager_id = Some(user.uuid);
        assert!(user.validate().is_err());
    }

    #[test]
    fn email_shape_and_initials() {
        assert!(is_valid_email("a.b@c.io"));
        assert!(!is_valid_email("a@b"));
        let user = User::new("E-2", "jane q doe", "j@c.io", Role::Hr);
        assert_eq!(user.initials(), "JQ");
    }
}
