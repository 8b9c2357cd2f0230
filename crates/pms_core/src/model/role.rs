//! Role model: the closed set of access levels.
//!
//! # Invariants
//! - Exactly five roles exist; persisted form is the upper-case name.
//! - Unknown role strings never error at the navigation boundary; they
//!   resolve to `Employee`, the least privileged role.

use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Hr,
    Manager,
    Teamlead,
    Employee,
}

impl Role {
    /// All roles, most privileged first.
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Hr,
        Role::Manager,
        Role::Teamlead,
        Role::Employee,
    ];

    /// Canonical upper-case string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Hr => "HR",
            Self::Manager => "MANAGER",
            Self::Teamlead => "TEAMLEAD",
            Self::Employee => "EMPLOYEE",
        }
    }

    /// Parses a role string, case-insensitive after trimming.
    pub fn parse(value: &str) -> Option<Role> {
        let normalized = value.trim();
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(normalized))
    }

    /// Parses a role string, falling back to `Employee` for anything unknown.
    pub fn from_str_or_default(value: &str) -> Role {
        Self::parse(value).unwrap_or_else(|| {
            warn!(
                "event=role_parse module=navigation status=fallback fallback={} input_len={}",
                Role::Employee.as_str(),
                value.len()
            );
            Role::Employee
        })
    }

    /// Higher rank means more privilege. `Employee` is 0.
    pub fn rank(self) -> u8 {
        match self {
            Self::Admin => 4,
            Self::Hr => 3,
            Self::Manager => 2,
            Self::Teamlead => 1,
            Self::Employee => 0,
        }
    }

    /// Whether this role leads people (manager or team lead).
    pub fn leads_team(self) -> bool {
        matches!(self, Self::Manager | Self::Teamlead)
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Role;

    #[test]
    fn parse_accepts_canonical_and_mixed_case() {
        assert_eq!(Role::parse("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::parse(" teamLead "), Some(Role::Teamlead));
        assert_eq!(Role::parse("hr"), Some(Role::Hr));
        assert_eq!(Role::parse("SUPERUSER"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn unknown_role_defaults_to_least_privilege() {
        assert_eq!(Role::from_str_or_default("root"), Role::Employee);
        assert_eq!(Role::from_str_or_default("MANAGER"), Role::Manager);
    }

    #[test]
    fn ranks_are_strictly_ordered() {
        let ranks: Vec<u8> = Role::ALL.iter().map(|role| role.rank()).collect();
        assert_eq!(ranks, vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn serde_uses_upper_case_names() {
        let json = serde_json::to_string(&Role::Teamlead).expect("serialize");
        assert_eq!(json, "\"TEAMLEAD\"");
        let parsed: Role = serde_json::from_str("\"HR\"").expect("deserialize");
        assert_eq!(parsed, Role::Hr);
    }
}
