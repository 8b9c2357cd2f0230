//! Review workflow persistence.
//!
//! # Invariants
//! - `(employee_uuid, cycle)` is unique.
//! - Listing order is `cycle DESC, updated_at DESC, uuid ASC`.

use crate::model::review::{Review, ReviewId, ReviewStatus};
use crate::model::user::UserId;
use crate::repo::{
    fetch_all_pages, map_unique_violation, parse_enum, parse_uuid, Page, RepoError, RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const REVIEW_SELECT_SQL: &str = "SELECT
    uuid,
    employee_uuid,
    reviewer_uuid,
    cycle,
    status,
    self_rating,
    manager_rating,
    self_comment,
    manager_comment
FROM reviews";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewListQuery {
    pub employee_id: Option<UserId>,
    pub reviewer_id: Option<UserId>,
    pub cycle: Option<String>,
    pub status: Option<ReviewStatus>,
    pub limit: Option<u32>,
    pub offset: u32,
}

pub trait ReviewRepository {
    fn create_review(&self, review: &Review) -> RepoResult<ReviewId>;
    fn update_review(&self, review: &Review) -> RepoResult<()>;
    fn get_review(&self, id: ReviewId) -> RepoResult<Option<Review>>;
    fn list_reviews(&self, query: &ReviewListQuery) -> RepoResult<Vec<Review>>;
    /// Every review matching `query`, ignoring its `limit`/`offset`.
    fn list_all_reviews(&self, query: &ReviewListQuery) -> RepoResult<Vec<Review>> {
        fetch_all_pages(|page| {
            self.list_reviews(&ReviewListQuery {
                limit: Some(page.limit),
                offset: page.offset,
                ..query.clone()
            })
        })
    }
}

pub struct SqliteReviewRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReviewRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ReviewRepository for SqliteReviewRepository<'_> {
    fn create_review(&self, review: &Review) -> RepoResult<ReviewId> {
        review.validate()?;

        self.conn
            .execute(
                "INSERT INTO reviews (
                    uuid,
                    employee_uuid,
                    reviewer_uuid,
                    cycle,
                    status,
                    self_rating,
                    manager_rating,
                    self_comment,
                    manager_comment
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
                params![
                    review.uuid.to_string(),
                    review.employee_id.to_string(),
                    review.reviewer_id.to_string(),
                    review.cycle.trim(),
                    review.status.as_str(),
                    review.self_rating,
                    review.manager_rating,
                    review.self_comment.as_deref(),
                    review.manager_comment.as_deref(),
                ],
            )
            .map_err(|err| map_unique_violation(err, "review", "cycle", review.cycle.trim()))?;

        Ok(review.uuid)
    }

    fn update_review(&self, review: &Review) -> RepoResult<()> {
        review.validate()?;

        let changed = self.conn.execute(
            "UPDATE reviews
             SET
                reviewer_uuid = ?1,
                status = ?2,
                self_rating = ?3,
                manager_rating = ?4,
                self_comment = ?5,
                manager_comment = ?6,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?7;",
            params![
                review.reviewer_id.to_string(),
                review.status.as_str(),
                review.self_rating,
                review.manager_rating,
                review.self_comment.as_deref(),
                review.manager_comment.as_deref(),
                review.uuid.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("review", review.uuid));
        }
        Ok(())
    }

    fn get_review(&self, id: ReviewId) -> RepoResult<Option<Review>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{REVIEW_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_review_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_reviews(&self, query: &ReviewListQuery) -> RepoResult<Vec<Review>> {
        let mut sql = format!("{REVIEW_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(employee_id) = query.employee_id {
            sql.push_str(" AND employee_uuid = ?");
            bind_values.push(Value::Text(employee_id.to_string()));
        }
        if let Some(reviewer_id) = query.reviewer_id {
            sql.push_str(" AND reviewer_uuid = ?");
            bind_values.push(Value::Text(reviewer_id.to_string()));
        }
        if let Some(cycle) = query.cycle.as_ref() {
            sql.push_str(" AND cycle = ?");
            bind_values.push(Value::Text(cycle.trim().to_string()));
        }
        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }

        let page = Page::normalize(query.limit, query.offset);
        sql.push_str(" ORDER BY cycle DESC, updated_at DESC, uuid ASC LIMIT ? OFFSET ?");
        bind_values.push(Value::Integer(i64::from(page.limit)));
        bind_values.push(Value::Integer(i64::from(page.offset)));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut reviews = Vec::new();
        while let Some(row) = rows.next()? {
            reviews.push(parse_review_row(row)?);
        }
        Ok(reviews)
    }
}

fn parse_rating(value: Option<i64>, column: &str) -> RepoResult<Option<u8>> {
    value
        .map(|raw| {
            u8::try_from(raw)
                .map_err(|_| RepoError::InvalidData(format!("invalid rating `{raw}` in {column}")))
        })
        .transpose()
}

fn parse_review_row(row: &Row<'_>) -> RepoResult<Review> {
    let uuid_text: String = row.get("uuid")?;
    let employee_text: String = row.get("employee_uuid")?;
    let reviewer_text: String = row.get("reviewer_uuid")?;
    let status_text: String = row.get("status")?;

    let review = Review {
        uuid: parse_uuid(&uuid_text, "reviews.uuid")?,
        employee_id: parse_uuid(&employee_text, "reviews.employee_uuid")?,
        reviewer_id: parse_uuid(&reviewer_text, "reviews.reviewer_uuid")?,
        cycle: row.get("cycle")?,
        status: parse_enum(&status_text, "reviews.status", ReviewStatus::parse)?,
        self_rating: parse_rating(row.get("self_rating")?, "reviews.self_rating")?,
        manager_rating: parse_rating(row.get("manager_rating")?, "reviews.manager_rating")?,
        self_comment: row.get("self_comment")?,
        manager_comment: row.get("manager_comment")?,
    };
    review
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("reviews row {uuid_text}: {err}")))?;
    Ok(review)
}
