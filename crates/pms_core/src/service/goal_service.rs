//! Goal tracking use-cases.
//!
//! # Invariants
//! - Employees manage their own goals; TEAMLEAD and above may manage goals
//!   they assign to others.
//! - Templates are created by MANAGER and above.
//! - Evidence attaches only to existing goals.

use crate::model::goal::{
    Evidence, Goal, GoalCategory, GoalId, GoalPriority, GoalStatus, GoalTemplate, TemplateId,
};
use crate::model::user::UserId;
use crate::repo::goal_repo::{GoalListQuery, GoalRepository};
use crate::service::{Actor, ServiceError, ServiceResult, LEADS_AND_UP, MANAGERS_AND_UP};
use log::info;

/// Input for creating one goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGoalRequest {
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    pub category: GoalCategory,
    pub priority: GoalPriority,
    pub due_date: Option<i64>,
    pub tags: Vec<String>,
}

/// Input for creating one template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTemplateRequest {
    pub name: String,
    pub description: String,
    pub category: GoalCategory,
    pub default_priority: GoalPriority,
    pub tags: Vec<String>,
}

/// Input for attaching evidence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvidenceRequest {
    pub title: String,
    pub description: String,
    pub link: Option<String>,
}

pub struct GoalService<R: GoalRepository> {
    repo: R,
}

impl<R: GoalRepository> GoalService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_goal(&self, actor: &Actor, request: NewGoalRequest) -> ServiceResult<Goal> {
        ensure_can_manage(actor, request.owner_id)?;

        let mut goal = Goal::new(request.owner_id, request.title.trim(), request.category);
        goal.description = request.description.trim().to_string();
        goal.priority = request.priority;
        goal.due_date = request.due_date;
        goal.set_tags(&request.tags);

        self.repo.create_goal(&goal)?;
        info!(
            "event=goal_create module=service status=ok category={} actor_role={}",
            goal.category.as_str(),
            actor.role
        );
        Ok(goal)
    }

    pub fn get_goal(&self, id: GoalId) -> ServiceResult<Goal> {
        self.repo
            .get_goal(id)?
            .ok_or_else(|| ServiceError::NotFound {
                entity: "goal",
                id: id.to_string(),
            })
    }

    /// Sets progress (0..=100) and persists the derived status.
    pub fn update_progress(&self, actor: &Actor, id: GoalId, progress: u8) -> ServiceResult<Goal> {
        let mut goal = self.get_goal(id)?;
        ensure_can_manage(actor, goal.owner_id)?;
        goal.apply_progress(progress)?;
        self.repo.update_goal(&goal)?;
        info!(
            "event=goal_progress module=service status=ok progress={} goal_status={}",
            goal.progress,
            goal.status.as_str()
        );
        Ok(goal)
    }

    /// Explicit status change. `Completed` also pins progress to 100.
    pub fn update_status(
        &self,
        actor: &Actor,
        id: GoalId,
        status: GoalStatus,
    ) -> ServiceResult<Goal> {
        let mut goal = self.get_goal(id)?;
        ensure_can_manage(actor, goal.owner_id)?;
        if status == GoalStatus::Completed {
            goal.status = GoalStatus::InProgress;
            goal.apply_progress(100)?;
        } else {
            if goal.progress == 100 {
                goal.progress = 99;
            }
            goal.status = status;
        }
        self.repo.update_goal(&goal)?;
        Ok(goal)
    }

    pub fn set_tags(&self, actor: &Actor, id: GoalId, tags: &[String]) -> ServiceResult<Goal> {
        let mut goal = self.get_goal(id)?;
        ensure_can_manage(actor, goal.owner_id)?;
        goal.set_tags(tags);
        self.repo.update_goal(&goal)?;
        Ok(goal)
    }

    pub fn delete_goal(&self, actor: &Actor, id: GoalId) -> ServiceResult<()> {
        let goal = self.get_goal(id)?;
        ensure_can_manage(actor, goal.owner_id)?;
        self.repo.delete_goal(id)?;
        Ok(())
    }

    pub fn list_goals(&self, query: &GoalListQuery) -> ServiceResult<Vec<Goal>> {
        Ok(self.repo.list_goals(query)?)
    }

    /// Every goal matching `query`, across all pages.
    pub fn list_all_goals(&self, query: &GoalListQuery) -> ServiceResult<Vec<Goal>> {
        Ok(self.repo.list_all_goals(query)?)
    }

    pub fn goals_for_owner(&self, owner_id: UserId) -> ServiceResult<Vec<Goal>> {
        self.list_all_goals(&GoalListQuery {
            owner_ids: vec![owner_id],
            ..GoalListQuery::default()
        })
    }

    /// Goals of `owner_id` as seen by `actor`: the owner, or TEAMLEAD and above.
    pub fn goals_visible_to(&self, actor: &Actor, owner_id: UserId) -> ServiceResult<Vec<Goal>> {
        if actor.id != owner_id {
            actor.require("view another user's goals", LEADS_AND_UP)?;
        }
        self.goals_for_owner(owner_id)
    }

    /// Marks open goals past their due date as overdue. Returns how many changed.
    pub fn refresh_overdue(&self, owner_ids: &[UserId], now_epoch_ms: i64) -> ServiceResult<usize> {
        let goals = self.list_all_goals(&GoalListQuery {
            owner_ids: owner_ids.to_vec(),
            ..GoalListQuery::default()
        })?;
        let mut changed = 0;
        for mut goal in goals {
            if goal.refresh_overdue(now_epoch_ms) {
                self.repo.update_goal(&goal)?;
                changed += 1;
            }
        }
        Ok(changed)
    }

    pub fn create_template(
        &self,
        actor: &Actor,
        request: NewTemplateRequest,
    ) -> ServiceResult<GoalTemplate> {
        actor.require("create goal templates", MANAGERS_AND_UP)?;
        let mut template = GoalTemplate::new(request.name.trim(), request.category);
        template.description = request.description.trim().to_string();
        template.default_priority = request.default_priority;
        template.tags = crate::model::normalize_tags(&request.tags);
        self.repo.create_template(&template)?;
        Ok(template)
    }

    pub fn list_templates(&self) -> ServiceResult<Vec<GoalTemplate>> {
        Ok(self.repo.list_templates()?)
    }

    /// Creates a goal for `owner_id` from a stored template.
    pub fn instantiate_template(
        &self,
        actor: &Actor,
        template_id: TemplateId,
        owner_id: UserId,
    ) -> ServiceResult<Goal> {
        ensure_can_manage(actor, owner_id)?;
        let template =
            self.repo
                .get_template(template_id)?
                .ok_or_else(|| ServiceError::NotFound {
                    entity: "goal template",
                    id: template_id.to_string(),
                })?;
        let goal = template.instantiate(owner_id);
        self.repo.create_goal(&goal)?;
        Ok(goal)
    }

    pub fn add_evidence(
        &self,
        actor: &Actor,
        goal_id: GoalId,
        request: NewEvidenceRequest,
    ) -> ServiceResult<Evidence> {
        let goal = self.get_goal(goal_id)?;
        ensure_can_manage(actor, goal.owner_id)?;

        let mut evidence = Evidence::new(goal_id, actor.id, request.title.trim());
        evidence.description = request.description.trim().to_string();
        evidence.link = request
            .link
            .map(|link| link.trim().to_string())
            .filter(|link| !link.is_empty());
        self.repo.add_evidence(&evidence)?;

        self.repo
            .list_evidence(goal_id)?
            .into_iter()
            .find(|item| item.uuid == evidence.uuid)
            .ok_or_else(|| ServiceError::NotFound {
                entity: "evidence",
                id: evidence.uuid.to_string(),
            })
    }

    pub fn list_evidence(&self, goal_id: GoalId) -> ServiceResult<Vec<Evidence>> {
        Ok(self.repo.list_evidence(goal_id)?)
    }
}

fn ensure_can_manage(actor: &Actor, owner_id: UserId) -> ServiceResult<()> {
    if actor.id == owner_id {
        return Ok(());
    }
    actor.require("manage another user's goals", LEADS_AND_UP)
}
