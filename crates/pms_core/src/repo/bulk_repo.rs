//! Bulk operation persistence.

use crate::model::bulk::{BulkOperation, BulkOperationId, BulkOperationKind, BulkOperationStatus};
use crate::repo::{parse_enum, parse_percent, parse_uuid, Page, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const BULK_SELECT_SQL: &str = "SELECT
    uuid,
    kind,
    status,
    progress,
    total_items,
    processed_items,
    created_by
FROM bulk_operations";

pub trait BulkOperationRepository {
    fn create_operation(&self, operation: &BulkOperation) -> RepoResult<BulkOperationId>;
    fn update_operation(&self, operation: &BulkOperation) -> RepoResult<()>;
    fn get_operation(&self, id: BulkOperationId) -> RepoResult<Option<BulkOperation>>;
    /// Most recently created first.
    fn list_operations(&self, limit: Option<u32>) -> RepoResult<Vec<BulkOperation>>;
}

pub struct SqliteBulkOperationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBulkOperationRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl BulkOperationRepository for SqliteBulkOperationRepository<'_> {
    fn create_operation(&self, operation: &BulkOperation) -> RepoResult<BulkOperationId> {
        self.conn.execute(
            "INSERT INTO bulk_operations (
                uuid,
                kind,
                status,
                progress,
                total_items,
                processed_items,
                created_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                operation.uuid.to_string(),
                operation.kind.as_str(),
                operation.status.as_str(),
                operation.progress,
                operation.total_items,
                operation.processed_items,
                operation.created_by.to_string(),
            ],
        )?;
        Ok(operation.uuid)
    }

    fn update_operation(&self, operation: &BulkOperation) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE bulk_operations
             SET
                status = ?1,
                progress = ?2,
                processed_items = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?4;",
            params![
                operation.status.as_str(),
                operation.progress,
                operation.processed_items,
                operation.uuid.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("bulk operation", operation.uuid));
        }
        Ok(())
    }

    fn get_operation(&self, id: BulkOperationId) -> RepoResult<Option<BulkOperation>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BULK_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_operation_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_operations(&self, limit: Option<u32>) -> RepoResult<Vec<BulkOperation>> {
        let page = Page::normalize(limit, 0);
        let mut stmt = self.conn.prepare(&format!(
            "{BULK_SELECT_SQL} ORDER BY created_at DESC, rowid DESC LIMIT ?1;"
        ))?;
        let mut rows = stmt.query([i64::from(page.limit)])?;
        let mut operations = Vec::new();
        while let Some(row) = rows.next()? {
            operations.push(parse_operation_row(row)?);
        }
        Ok(operations)
    }
}

fn parse_count(value: i64, column: &str) -> RepoResult<u32> {
    u32::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid count `{value}` in {column}")))
}

fn parse_operation_row(row: &Row<'_>) -> RepoResult<BulkOperation> {
    let uuid_text: String = row.get("uuid")?;
    let kind_text: String = row.get("kind")?;
    let status_text: String = row.get("status")?;
    let created_by: String = row.get("created_by")?;

    Ok(BulkOperation {
        uuid: parse_uuid(&uuid_text, "bulk_operations.uuid")?,
        kind: parse_enum(&kind_text, "bulk_operations.kind", BulkOperationKind::parse)?,
        status: parse_enum(
            &status_text,
            "bulk_operations.status",
            BulkOperationStatus::parse,
        )?,
        progress: parse_percent(row.get("progress")?, "bulk_operations.progress")?,
        total_items: parse_count(row.get("total_items")?, "bulk_operations.total_items")?,
        processed_items: parse_count(
            row.get("processed_items")?,
            "bulk_operations.processed_items",
        )?,
        created_by: parse_uuid(&created_by, "bulk_operations.created_by")?,
    })
}
