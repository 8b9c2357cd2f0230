//! Master data repository (departments, domains, projects).
//!
//! # Invariants
//! - `(kind, code)` is unique; codes are persisted upper-case.
//! - Listing order is `name ASC, code ASC` within one kind.

use crate::model::master::{normalize_code, MasterId, MasterKind, MasterRecord};
use crate::repo::{
    bool_to_int, map_unique_violation, parse_bool, parse_enum, parse_uuid, RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row};

const MASTER_SELECT_SQL: &str = "SELECT
    uuid,
    kind,
    code,
    name,
    description,
    employee_count,
    domain_code,
    is_active
FROM masters";

pub trait MasterRepository {
    fn create_master(&self, record: &MasterRecord) -> RepoResult<MasterId>;
    fn update_master(&self, record: &MasterRecord) -> RepoResult<()>;
    fn get_master(&self, id: MasterId) -> RepoResult<Option<MasterRecord>>;
    fn get_by_code(&self, kind: MasterKind, code: &str) -> RepoResult<Option<MasterRecord>>;
    fn list_masters(&self, kind: MasterKind, active_only: bool) -> RepoResult<Vec<MasterRecord>>;
    fn set_active(&self, id: MasterId, active: bool) -> RepoResult<()>;
}

pub struct SqliteMasterRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMasterRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl MasterRepository for SqliteMasterRepository<'_> {
    fn create_master(&self, record: &MasterRecord) -> RepoResult<MasterId> {
        record.validate()?;

        self.conn
            .execute(
                "INSERT INTO masters (
                    uuid,
                    kind,
                    code,
                    name,
                    description,
                    employee_count,
                    domain_code,
                    is_active
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
                params![
                    record.uuid.to_string(),
                    record.kind.as_str(),
                    record.code.as_str(),
                    record.name.trim(),
                    record.description.as_str(),
                    record.employee_count,
                    record.domain_code.as_deref().map(normalize_code),
                    bool_to_int(record.is_active),
                ],
            )
            .map_err(|err| map_unique_violation(err, record.kind.as_str(), "code", &record.code))?;

        Ok(record.uuid)
    }

    fn update_master(&self, record: &MasterRecord) -> RepoResult<()> {
        record.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE masters
                 SET
                    code = ?1,
                    name = ?2,
                    description = ?3,
                    employee_count = ?4,
                    domain_code = ?5,
                    is_active = ?6,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?7 AND kind = ?8;",
                params![
                    record.code.as_str(),
                    record.name.trim(),
                    record.description.as_str(),
                    record.employee_count,
                    record.domain_code.as_deref().map(normalize_code),
                    bool_to_int(record.is_active),
                    record.uuid.to_string(),
                    record.kind.as_str(),
                ],
            )
            .map_err(|err| map_unique_violation(err, record.kind.as_str(), "code", &record.code))?;

        if changed == 0 {
            return Err(RepoError::not_found(record.kind.as_str(), record.uuid));
        }
        Ok(())
    }

    fn get_master(&self, id: MasterId) -> RepoResult<Option<MasterRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MASTER_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_master_row(row)?)),
            None => Ok(None),
        }
    }

    fn get_by_code(&self, kind: MasterKind, code: &str) -> RepoResult<Option<MasterRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MASTER_SELECT_SQL} WHERE kind = ?1 AND code = ?2;"
        ))?;
        let mut rows = stmt.query(params![kind.as_str(), normalize_code(code)])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_master_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_masters(&self, kind: MasterKind, active_only: bool) -> RepoResult<Vec<MasterRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MASTER_SELECT_SQL}
             WHERE kind = ?1
               AND (?2 = 0 OR is_active = 1)
             ORDER BY name COLLATE NOCASE ASC, code ASC;"
        ))?;
        let mut rows = stmt.query(params![kind.as_str(), bool_to_int(active_only)])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_master_row(row)?);
        }
        Ok(records)
    }

    fn set_active(&self, id: MasterId, active: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE masters
             SET
                is_active = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?2;",
            params![bool_to_int(active), id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("master", id));
        }
        Ok(())
    }
}

fn parse_master_row(row: &Row<'_>) -> RepoResult<MasterRecord> {
    let uuid_text: String = row.get("uuid")?;
    let kind_text: String = row.get("kind")?;
    let employee_count: i64 = row.get("employee_count")?;

    Ok(MasterRecord {
        uuid: parse_uuid(&uuid_text, "masters.uuid")?,
        kind: parse_enum(&kind_text, "masters.kind", MasterKind::parse)?,
        code: row.get("code")?,
        name: row.get("name")?,
        description: row.get("description")?,
        employee_count: u32::try_from(employee_count).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid employee_count `{employee_count}` in masters.employee_count"
            ))
        })?,
        domain_code: row.get("domain_code")?,
        is_active: parse_bool(row.get("is_active")?, "masters.is_active")?,
    })
}
