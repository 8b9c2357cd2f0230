//! Goal, template and evidence persistence.
//!
//! # Invariants
//! - Goal tags are replaced as a whole set inside one transaction.
//! - Deleting a goal cascades to its tags and evidence.
//! - Goal listing order is `due_date ASC NULLS LAST, title ASC, uuid ASC`.
//! - Template tags persist as a JSON array.

use crate::model::goal::{
    Evidence, EvidenceId, Goal, GoalCategory, GoalId, GoalPriority, GoalStatus, GoalTemplate,
    TemplateId,
};
use crate::model::normalize_tags;
use crate::model::user::UserId;
use crate::repo::{
    fetch_all_pages, parse_enum, parse_optional_uuid, parse_percent, parse_uuid, Page, RepoError,
    RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const GOAL_SELECT_SQL: &str = "SELECT
    uuid,
    owner_uuid,
    title,
    description,
    category,
    priority,
    status,
    progress,
    due_date,
    template_uuid
FROM goals";

/// Filters for goal listing. All filters combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalListQuery {
    /// Empty means any owner.
    pub owner_ids: Vec<UserId>,
    pub status: Option<GoalStatus>,
    pub category: Option<GoalCategory>,
    /// Exact match on a normalized tag.
    pub tag: Option<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

pub trait GoalRepository {
    fn create_goal(&self, goal: &Goal) -> RepoResult<GoalId>;
    fn update_goal(&self, goal: &Goal) -> RepoResult<()>;
    fn get_goal(&self, id: GoalId) -> RepoResult<Option<Goal>>;
    fn list_goals(&self, query: &GoalListQuery) -> RepoResult<Vec<Goal>>;
    /// Every goal matching `query`, ignoring its `limit`/`offset`.
    fn list_all_goals(&self, query: &GoalListQuery) -> RepoResult<Vec<Goal>> {
        fetch_all_pages(|page| {
            self.list_goals(&GoalListQuery {
                limit: Some(page.limit),
                offset: page.offset,
                ..query.clone()
            })
        })
    }
    fn delete_goal(&self, id: GoalId) -> RepoResult<()>;

    fn create_template(&self, template: &GoalTemplate) -> RepoResult<TemplateId>;
    fn get_template(&self, id: TemplateId) -> RepoResult<Option<GoalTemplate>>;
    fn list_templates(&self) -> RepoResult<Vec<GoalTemplate>>;

    fn add_evidence(&self, evidence: &Evidence) -> RepoResult<EvidenceId>;
    fn list_evidence(&self, goal_id: GoalId) -> RepoResult<Vec<Evidence>>;
}

pub struct SqliteGoalRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGoalRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl GoalRepository for SqliteGoalRepository<'_> {
    fn create_goal(&self, goal: &Goal) -> RepoResult<GoalId> {
        goal.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO goals (
                uuid,
                owner_uuid,
                title,
                description,
                category,
                priority,
                status,
                progress,
                due_date,
                template_uuid
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                goal.uuid.to_string(),
                goal.owner_id.to_string(),
                goal.title.trim(),
                goal.description.as_str(),
                goal.category.as_str(),
                goal.priority.as_str(),
                goal.status.as_str(),
                goal.progress,
                goal.due_date,
                goal.template_id.map(|id| id.to_string()),
            ],
        )?;
        replace_tags(&tx, goal)?;
        tx.commit()?;

        Ok(goal.uuid)
    }

    fn update_goal(&self, goal: &Goal) -> RepoResult<()> {
        goal.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE goals
             SET
                owner_uuid = ?1,
                title = ?2,
                description = ?3,
                category = ?4,
                priority = ?5,
                status = ?6,
                progress = ?7,
                due_date = ?8,
                template_uuid = ?9,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?10;",
            params![
                goal.owner_id.to_string(),
                goal.title.trim(),
                goal.description.as_str(),
                goal.category.as_str(),
                goal.priority.as_str(),
                goal.status.as_str(),
                goal.progress,
                goal.due_date,
                goal.template_id.map(|id| id.to_string()),
                goal.uuid.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("goal", goal.uuid));
        }
        replace_tags(&tx, goal)?;
        tx.commit()?;

        Ok(())
    }

    fn get_goal(&self, id: GoalId) -> RepoResult<Option<Goal>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GOAL_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_goal_row(self.conn, row)?)),
            None => Ok(None),
        }
    }

    fn list_goals(&self, query: &GoalListQuery) -> RepoResult<Vec<Goal>> {
        let mut sql = format!("{GOAL_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.owner_ids.is_empty() {
            let placeholders = vec!["?"; query.owner_ids.len()].join(", ");
            sql.push_str(&format!(" AND owner_uuid IN ({placeholders})"));
            bind_values.extend(
                query
                    .owner_ids
                    .iter()
                    .map(|id| Value::Text(id.to_string())),
            );
        }
        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }
        if let Some(category) = query.category {
            sql.push_str(" AND category = ?");
            bind_values.push(Value::Text(category.as_str().to_string()));
        }
        if let Some(tag) = query.tag.as_ref() {
            sql.push_str(
                " AND EXISTS (
                    SELECT 1 FROM goal_tags gt
                    WHERE gt.goal_uuid = goals.uuid AND gt.tag = ?
                )",
            );
            bind_values.push(Value::Text(tag.trim().to_lowercase()));
        }

        let page = Page::normalize(query.limit, query.offset);
        sql.push_str(
            " ORDER BY due_date IS NULL, due_date ASC, title COLLATE NOCASE ASC, uuid ASC
              LIMIT ? OFFSET ?",
        );
        bind_values.push(Value::Integer(i64::from(page.limit)));
        bind_values.push(Value::Integer(i64::from(page.offset)));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut goals = Vec::new();
        while let Some(row) = rows.next()? {
            goals.push(parse_goal_row(self.conn, row)?);
        }
        Ok(goals)
    }

    fn delete_goal(&self, id: GoalId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM goals WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found("goal", id));
        }
        Ok(())
    }

    fn create_template(&self, template: &GoalTemplate) -> RepoResult<TemplateId> {
        template.validate()?;
        let tags_json = serde_json::to_string(&normalize_tags(&template.tags))
            .map_err(|err| RepoError::InvalidData(format!("template tags: {err}")))?;

        self.conn.execute(
            "INSERT INTO goal_templates (
                uuid,
                name,
                description,
                category,
                default_priority,
                tags
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                template.uuid.to_string(),
                template.name.trim(),
                template.description.as_str(),
                template.category.as_str(),
                template.default_priority.as_str(),
                tags_json,
            ],
        )?;
        Ok(template.uuid)
    }

    fn get_template(&self, id: TemplateId) -> RepoResult<Option<GoalTemplate>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, name, description, category, default_priority, tags
             FROM goal_templates
             WHERE uuid = ?1;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_template_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_templates(&self) -> RepoResult<Vec<GoalTemplate>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, name, description, category, default_priority, tags
             FROM goal_templates
             ORDER BY name COLLATE NOCASE ASC, uuid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut templates = Vec::new();
        while let Some(row) = rows.next()? {
            templates.push(parse_template_row(row)?);
        }
        Ok(templates)
    }

    fn add_evidence(&self, evidence: &Evidence) -> RepoResult<EvidenceId> {
        evidence.validate()?;
        if self.get_goal(evidence.goal_id)?.is_none() {
            return Err(RepoError::not_found("goal", evidence.goal_id));
        }

        self.conn.execute(
            "INSERT INTO evidence (
                uuid,
                goal_uuid,
                title,
                description,
                link,
                submitted_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                evidence.uuid.to_string(),
                evidence.goal_id.to_string(),
                evidence.title.trim(),
                evidence.description.as_str(),
                evidence.link.as_deref(),
                evidence.submitted_by.to_string(),
            ],
        )?;
        Ok(evidence.uuid)
    }

    fn list_evidence(&self, goal_id: GoalId) -> RepoResult<Vec<Evidence>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, goal_uuid, title, description, link, submitted_by, created_at
             FROM evidence
             WHERE goal_uuid = ?1
             ORDER BY created_at ASC, uuid ASC;",
        )?;
        let mut rows = stmt.query([goal_id.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get("uuid")?;
            let goal_text: String = row.get("goal_uuid")?;
            let submitted_text: String = row.get("submitted_by")?;
            items.push(Evidence {
                uuid: parse_uuid(&uuid_text, "evidence.uuid")?,
                goal_id: parse_uuid(&goal_text, "evidence.goal_uuid")?,
                title: row.get("title")?,
                description: row.get("description")?,
                link: row.get("link")?,
                submitted_by: parse_uuid(&submitted_text, "evidence.submitted_by")?,
                created_at: row.get("created_at")?,
            });
        }
        Ok(items)
    }
}

fn replace_tags(conn: &Connection, goal: &Goal) -> RepoResult<()> {
    let goal_uuid = goal.uuid.to_string();
    conn.execute(
        "DELETE FROM goal_tags WHERE goal_uuid = ?1;",
        [goal_uuid.as_str()],
    )?;
    for tag in normalize_tags(&goal.tags) {
        conn.execute(
            "INSERT INTO goal_tags (goal_uuid, tag) VALUES (?1, ?2);",
            params![goal_uuid.as_str(), tag],
        )?;
    }
    Ok(())
}

fn load_tags(conn: &Connection, goal_uuid: &str) -> RepoResult<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT tag FROM goal_tags WHERE goal_uuid = ?1 ORDER BY tag ASC;")?;
    let mut rows = stmt.query([goal_uuid])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(row.get::<_, String>(0)?);
    }
    Ok(tags)
}

fn parse_goal_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Goal> {
    let uuid_text: String = row.get("uuid")?;
    let owner_text: String = row.get("owner_uuid")?;
    let category: String = row.get("category")?;
    let priority: String = row.get("priority")?;
    let status: String = row.get("status")?;

    let goal = Goal {
        uuid: parse_uuid(&uuid_text, "goals.uuid")?,
        owner_id: parse_uuid(&owner_text, "goals.owner_uuid")?,
        title: row.get("title")?,
        description: row.get("description")?,
        category: parse_enum(&category, "goals.category", GoalCategory::parse)?,
        priority: parse_enum(&priority, "goals.priority", GoalPriority::parse)?,
        status: parse_enum(&status, "goals.status", GoalStatus::parse)?,
        progress: parse_percent(row.get("progress")?, "goals.progress")?,
        due_date: row.get("due_date")?,
        tags: load_tags(conn, &uuid_text)?,
        template_id: parse_optional_uuid(row.get("template_uuid")?, "goals.template_uuid")?,
    };
    goal.validate()
        .map_err(|err| RepoError::InvalidData(format!("goals row {uuid_text}: {err}")))?;
    Ok(goal)
}

fn parse_template_row(row: &Row<'_>) -> RepoResult<GoalTemplate> {
    let uuid_text: String = row.get("uuid")?;
    let category: String = row.get("category")?;
    let priority: String = row.get("default_priority")?;
    let tags_json: String = row.get("tags")?;
    let tags: Vec<String> = serde_json::from_str(&tags_json).map_err(|err| {
        RepoError::InvalidData(format!("invalid tags json in goal_templates.tags: {err}"))
    })?;

    Ok(GoalTemplate {
        uuid: parse_uuid(&uuid_text, "goal_templates.uuid")?,
        name: row.get("name")?,
        description: row.get("description")?,
        category: parse_enum(&category, "goal_templates.category", GoalCategory::parse)?,
        default_priority: parse_enum(
            &priority,
            "goal_templates.default_priority",
            GoalPriority::parse,
        )?,
        tags,
    })
}
