//! Credential verification contracts and the demo account directory.

use crate::auth::store::SessionUser;
use crate::model::role::Role;
use uuid::Uuid;

/// Shared password for every demo account.
pub const DEMO_PASSWORD: &str = "password123";

/// One entry of the demo directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoAccount {
    pub id: u128,
    pub employee_id: &'static str,
    pub name: &'static str,
    pub email: &'static str,
    pub role: Role,
    pub department: &'static str,
}

impl DemoAccount {
    pub fn user_id(&self) -> Uuid {
        Uuid::from_u128(self.id)
    }

    pub fn session_user(&self) -> SessionUser {
        SessionUser {
            id: self.user_id(),
            employee_id: self.employee_id.to_string(),
            name: self.name.to_string(),
            email: self.email.to_string(),
            role: self.role,
            department: Some(self.department.to_string()),
        }
    }
}

const DEMO_ADMIN: DemoAccount = DemoAccount {
    id: 0x0000_0000_0000_4000_8000_0000_0000_0001,
    employee_id: "EMP001",
    name: "Alex Admin",
    email: "admin@company.com",
    role: Role::Admin,
    department: "Administration",
};

const DEMO_HR: DemoAccount = DemoAccount {
    id: 0x0000_0000_0000_4000_8000_0000_0000_0002,
    employee_id: "EMP002",
    name: "Harper Reyes",
    email: "hr@company.com",
    role: Role::Hr,
    department: "Human Resources",
};

const DEMO_MANAGER: DemoAccount = DemoAccount {
    id: 0x0000_0000_0000_4000_8000_0000_0000_0003,
    employee_id: "EMP003",
    name: "Morgan Blake",
    email: "manager@company.com",
    role: Role::Manager,
    department: "Engineering",
};

const DEMO_TEAMLEAD: DemoAccount = DemoAccount {
    id: 0x0000_0000_0000_4000_8000_0000_0000_0004,
    employee_id: "EMP004",
    name: "Taylor Quinn",
    email: "teamlead@company.com",
    role: Role::Teamlead,
    department: "Engineering",
};

const DEMO_EMPLOYEE: DemoAccount = DemoAccount {
    id: 0x0000_0000_0000_4000_8000_0000_0000_0005,
    employee_id: "EMP005",
    name: "Emery Lane",
    email: "employee@company.com",
    role: Role::Employee,
    department: "Engineering",
};

/// One account per role. Team members report to the team lead, who reports
/// to the manager.
pub const DEMO_ACCOUNTS: [DemoAccount; 5] = [
    DEMO_ADMIN,
    DEMO_HR,
    DEMO_MANAGER,
    DEMO_TEAMLEAD,
    DEMO_EMPLOYEE,
];

/// Looks up a demo account by email (case-insensitive).
pub fn demo_account(email: &str) -> Option<&'static DemoAccount> {
    let email = email.trim();
    DEMO_ACCOUNTS
        .iter()
        .find(|account| account.email.eq_ignore_ascii_case(email))
}

/// Demo account for one role.
pub fn demo_account_for_role(role: Role) -> &'static DemoAccount {
    match role {
        Role::Admin => &DEMO_ADMIN,
        Role::Hr => &DEMO_HR,
        Role::Manager => &DEMO_MANAGER,
        Role::Teamlead => &DEMO_TEAMLEAD,
        Role::Employee => &DEMO_EMPLOYEE,
    }
}

/// Checks credentials and returns the matched identity.
pub trait CredentialVerifier {
    fn verify(&self, email: &str, password: &str) -> Option<SessionUser>;
}

/// In-memory mock verifier over [`DEMO_ACCOUNTS`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoCredentialVerifier;

impl CredentialVerifier for DemoCredentialVerifier {
    fn verify(&self, email: &str, password: &str) -> Option<SessionUser> {
        if password != DEMO_PASSWORD {
            return None;
        }
        demo_account(email).map(DemoAccount::session_user)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        demo_account_for_role, CredentialVerifier, DemoCredentialVerifier, DEMO_ACCOUNTS,
        DEMO_PASSWORD,
    };
    use crate::model::role::Role;
    use std::collections::HashSet;

    #[test]
    fn demo_directory_has_one_account_per_role() {
        let roles: HashSet<Role> = DEMO_ACCOUNTS.iter().map(|account| account.role).collect();
        assert_eq!(roles.len(), Role::ALL.len());
        for role in Role::ALL {
            let account = demo_account_for_role(role);
            assert_eq!(account.role, role);
            assert!(DEMO_ACCOUNTS.iter().any(|listed| listed.email == account.email));
        }
    }

    #[test]
    fn verifier_accepts_only_demo_password() {
        let verifier = DemoCredentialVerifier;
        let user = verifier
            .verify("Manager@Company.com", DEMO_PASSWORD)
            .expect("demo manager should verify");
        assert_eq!(user.role, Role::Manager);

        assert!(verifier.verify("manager@company.com", "wrong").is_none());
        assert!(verifier.verify("ghost@company.com", DEMO_PASSWORD).is_none());
    }
}
