//! Demo data.
//!
//! # Invariants
//! - Seeding is idempotent; rows that already exist are left untouched.
//! - Demo users keep the ids of the demo credential directory so a demo
//!   login reconciles with the user table.

use crate::auth::credentials::{demo_account_for_role, DEMO_ACCOUNTS};
use crate::model::master::{MasterKind, MasterRecord};
use crate::model::role::Role;
use crate::model::user::User;
use crate::repo::master_repo::{MasterRepository, SqliteMasterRepository};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::repo::RepoResult;
use log::info;
use rusqlite::Connection;

/// Rows inserted by one [`seed_demo_data`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub masters: usize,
}

// (kind, code, name, description, employee_count, domain_code)
const DEMO_MASTERS: &[(MasterKind, &str, &str, &str, u32, Option<&str>)] = &[
    (MasterKind::Department, "ENG", "Engineering", "Product engineering", 42, None),
    (MasterKind::Department, "HR", "Human Resources", "People operations", 6, None),
    (MasterKind::Department, "ADMIN", "Administration", "Company administration", 4, None),
    (MasterKind::Domain, "FIN", "Finance", "Banking and payments", 18, None),
    (MasterKind::Domain, "HEALTH", "Healthcare", "Clinical platforms", 12, None),
    (MasterKind::Project, "PAYGW", "Payment Gateway", "Card processing rewrite", 9, Some("FIN")),
    (MasterKind::Project, "EHR-SYNC", "EHR Sync", "Records integration", 7, Some("HEALTH")),
];

/// Inserts the demo users and sample master data when missing.
pub fn seed_demo_data(conn: &Connection) -> RepoResult<SeedReport> {
    let tx = conn.unchecked_transaction()?;
    let report = SeedReport {
        masters: seed_masters(&tx)?,
        users: seed_users(&tx)?,
    };
    tx.commit()?;

    info!(
        "event=seed module=seed status=ok users={} masters={}",
        report.users, report.masters
    );
    Ok(report)
}

fn seed_users(conn: &Connection) -> RepoResult<usize> {
    let repo = SqliteUserRepository::new(conn);
    let mut inserted = 0;
    for account in DEMO_ACCOUNTS.iter() {
        if repo.get_user(account.user_id())?.is_some() {
            continue;
        }
        let mut user = User::new(account.employee_id, account.name, account.email, account.role);
        user.uuid = account.user_id();
        user.department = Some(account.department.to_string());
        user.manager_id =
            demo_manager_of(account.role).map(|role| demo_account_for_role(role).user_id());
        if account.department == "Engineering" {
            user.domain = Some("FIN".to_string());
            user.project = Some("PAYGW".to_string());
        }
        repo.create_user(&user)?;
        inserted += 1;
    }
    Ok(inserted)
}

/// Reporting line of the demo org: employee -> team lead -> manager -> admin.
fn demo_manager_of(role: Role) -> Option<Role> {
    match role {
        Role::Employee => Some(Role::Teamlead),
        Role::Teamlead => Some(Role::Manager),
        Role::Manager | Role::Hr => Some(Role::Admin),
        Role::Admin => None,
    }
}

fn seed_masters(conn: &Connection) -> RepoResult<usize> {
    let repo = SqliteMasterRepository::new(conn);
    let mut inserted = 0;
    for &(kind, code, name, description, employee_count, domain_code) in DEMO_MASTERS {
        if repo.get_by_code(kind, code)?.is_some() {
            continue;
        }
        let mut record = MasterRecord::new(kind, code, name);
        record.description = description.to_string();
        record.employee_count = employee_count;
        record.domain_code = domain_code.map(str::to_string);
        repo.create_master(&record)?;
        inserted += 1;
    }
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::seed_demo_data;
    use crate::db::open_db_in_memory;

    #[test]
    fn seeding_twice_inserts_once() {
        let conn = open_db_in_memory().expect("open db");
        let first = seed_demo_data(&conn).expect("first seed");
        assert_eq!(first.users, 5);
        assert_eq!(first.masters, 7);

        let second = seed_demo_data(&conn).expect("second seed");
        assert_eq!(second.users, 0);
        assert_eq!(second.masters, 0);
    }
}
