//! User repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Email uniqueness is case-insensitive (`COLLATE NOCASE`).
//! - Listing order is deterministic: `name ASC, uuid ASC`.

use crate::model::role::Role;
use crate::model::user::{User, UserId};
use crate::repo::{
    bool_to_int, fetch_all_pages, map_unique_violation, parse_bool, parse_enum,
    parse_optional_uuid, parse_uuid, Page, RepoError, RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const USER_SELECT_SQL: &str = "SELECT
    uuid,
    employee_id,
    name,
    email,
    role,
    department,
    domain,
    project,
    manager_uuid,
    is_active
FROM users";

/// Filters for user listing. All filters combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserListQuery {
    pub role: Option<Role>,
    /// Exact, case-insensitive department match.
    pub department: Option<String>,
    pub manager_id: Option<UserId>,
    pub active_only: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

pub trait UserRepository {
    fn create_user(&self, user: &User) -> RepoResult<UserId>;
    fn update_user(&self, user: &User) -> RepoResult<()>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    fn list_users(&self, query: &UserListQuery) -> RepoResult<Vec<User>>;
    /// Every user matching `query`, ignoring its `limit`/`offset`.
    fn list_all_users(&self, query: &UserListQuery) -> RepoResult<Vec<User>> {
        fetch_all_pages(|page| {
            self.list_users(&UserListQuery {
                limit: Some(page.limit),
                offset: page.offset,
                ..query.clone()
            })
        })
    }
    fn set_active(&self, id: UserId, active: bool) -> RepoResult<()>;
}

pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &User) -> RepoResult<UserId> {
        user.validate()?;

        if self.find_by_email(&user.email)?.is_some() {
            return Err(RepoError::Duplicate {
                entity: "user",
                field: "email",
                value: user.email.trim().to_string(),
            });
        }

        self.conn
            .execute(
                "INSERT INTO users (
                    uuid,
                    employee_id,
                    name,
                    email,
                    role,
                    department,
                    domain,
                    project,
                    manager_uuid,
                    is_active
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
                params![
                    user.uuid.to_string(),
                    user.employee_id.trim(),
                    user.name.trim(),
                    user.email.trim(),
                    user.role.as_str(),
                    user.department.as_deref(),
                    user.domain.as_deref(),
                    user.project.as_deref(),
                    user.manager_id.map(|id| id.to_string()),
                    bool_to_int(user.is_active),
                ],
            )
            .map_err(|err| map_unique_violation(err, "user", "employee_id", &user.employee_id))?;

        Ok(user.uuid)
    }

    fn update_user(&self, user: &User) -> RepoResult<()> {
        user.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE users
                 SET
                    employee_id = ?1,
                    name = ?2,
                    email = ?3,
                    role = ?4,
                    department = ?5,
                    domain = ?6,
                    project = ?7,
                    manager_uuid = ?8,
                    is_active = ?9,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?10;",
                params![
                    user.employee_id.trim(),
                    user.name.trim(),
                    user.email.trim(),
                    user.role.as_str(),
                    user.department.as_deref(),
                    user.domain.as_deref(),
                    user.project.as_deref(),
                    user.manager_id.map(|id| id.to_string()),
                    bool_to_int(user.is_active),
                    user.uuid.to_string(),
                ],
            )
            .map_err(|err| map_unique_violation(err, "user", "email", &user.email))?;

        if changed == 0 {
            return Err(RepoError::not_found("user", user.uuid));
        }
        Ok(())
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_user_row(row)?)),
            None => Ok(None),
        }
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let mut stmt = self.conn.prepare(&format!(
            "{USER_SELECT_SQL} WHERE email = ?1 COLLATE NOCASE;"
        ))?;
        let mut rows = stmt.query([email.trim()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_user_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_users(&self, query: &UserListQuery) -> RepoResult<Vec<User>> {
        let mut sql = format!("{USER_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if query.active_only {
            sql.push_str(" AND is_active = 1");
        }
        if let Some(role) = query.role {
            sql.push_str(" AND role = ?");
            bind_values.push(Value::Text(role.as_str().to_string()));
        }
        if let Some(department) = query.department.as_ref() {
            sql.push_str(" AND department = ? COLLATE NOCASE");
            bind_values.push(Value::Text(department.trim().to_string()));
        }
        if let Some(manager_id) = query.manager_id {
            sql.push_str(" AND manager_uuid = ?");
            bind_values.push(Value::Text(manager_id.to_string()));
        }

        let page = Page::normalize(query.limit, query.offset);
        sql.push_str(" ORDER BY name COLLATE NOCASE ASC, uuid ASC LIMIT ? OFFSET ?");
        bind_values.push(Value::Integer(i64::from(page.limit)));
        bind_values.push(Value::Integer(i64::from(page.offset)));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }
        Ok(users)
    }

    fn set_active(&self, id: UserId, active: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE users
             SET
                is_active = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?2;",
            params![bool_to_int(active), id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("user", id));
        }
        Ok(())
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let uuid_text: String = row.get("uuid")?;
    let role_text: String = row.get("role")?;

    let user = User {
        uuid: parse_uuid(&uuid_text, "users.uuid")?,
        employee_id: row.get("employee_id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        role: parse_enum(&role_text, "users.role", Role::parse)?,
        department: row.get("department")?,
        domain: row.get("domain")?,
        project: row.get("project")?,
        manager_id: parse_optional_uuid(row.get("manager_uuid")?, "users.manager_uuid")?,
        is_active: parse_bool(row.get("is_active")?, "users.is_active")?,
    };
    user.validate()
        .map_err(|err| RepoError::InvalidData(format!("users row {uuid_text}: {err}")))?;
    Ok(user)
}
