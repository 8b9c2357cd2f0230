//! Master data: departments, domains and projects.
//!
//! # Invariants
//! - `name` and `code` are required; codes are stored upper-case.
//! - Codes are unique per master kind, not across kinds.
//! - `employee_count` is a hand-entered figure and is never recomputed.
//! - `domain_code` is only meaningful for projects.

use crate::model::{require_text, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type MasterId = Uuid;

static CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9][A-Z0-9_-]{1,15}$").expect("valid master code regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MasterKind {
    Department,
    Domain,
    Project,
}

impl MasterKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Department => "department",
            Self::Domain => "domain",
            Self::Project => "project",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "department" => Some(Self::Department),
            "domain" => Some(Self::Domain),
            "project" => Some(Self::Project),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterRecord {
    pub uuid: MasterId,
    pub kind: MasterKind,
    pub code: String,
    pub name: String,
    pub description: String,
    pub employee_count: u32,
    pub domain_code: Option<String>,
    pub is_active: bool,
}

impl MasterRecord {
    /// Creates an active record; `code` is normalized on construction.
    pub fn new(kind: MasterKind, code: &str, name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            kind,
            code: normalize_code(code),
            name: name.into(),
            description: String::new(),
            employee_count: 0,
            domain_code: None,
            is_active: true,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_text("code", &self.code)?;
        if !CODE_RE.is_match(&self.code) {
            return Err(ValidationError::invalid(
                "code",
                "expected 2-16 chars of A-Z, 0-9, `_` or `-`",
            ));
        }
        if self.domain_code.is_some() && self.kind != MasterKind::Project {
            return Err(ValidationError::invalid(
                "domain_code",
                "only projects belong to a domain",
            ));
        }
        Ok(())
    }
}

/// Trims and upper-cases a master code.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::{MasterKind, MasterRecord};
    use crate::model::ValidationError;

    #[test]
    fn code_is_normalized_and_validated() {
        let record = MasterRecord::new(MasterKind::Department, " eng ", "Engineering");
        assert_eq!(record.code, "ENG");
        assert!(record.validate().is_ok());

        let record = MasterRecord::new(MasterKind::Department, "e", "Engineering");
        assert!(matches!(
            record.validate(),
            Err(ValidationError::InvalidField { field: "code", .. })
        ));
    }

    #[test]
    fn only_projects_reference_domains() {
        let mut record = MasterRecord::new(MasterKind::Domain, "FIN", "Finance");
        record.domain_code = Some("FIN".to_string());
        assert!(record.validate().is_err());

        let mut project = MasterRecord::new(MasterKind::Project, "LEDGER", "Ledger");
        project.domain_code = Some("FIN".to_string());
        assert!(project.validate().is_ok());
    }
}
