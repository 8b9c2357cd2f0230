//! Goal, goal template and evidence models.
//!
//! # Invariants
//! - `progress` is always within `0..=100`.
//! - Progress 100 implies `Completed`; progress above zero moves a
//!   `NotStarted` goal to `InProgress`.
//! - Cancelled goals do not accept progress updates.
//! - Tags are lowercase, deduplicated and sorted.

use crate::model::user::UserId;
use crate::model::{normalize_tags, require_text, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type GoalId = Uuid;
pub type TemplateId = Uuid;
pub type EvidenceId = Uuid;

pub const MAX_PROGRESS: u8 = 100;

macro_rules! string_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }

            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalCategory {
    Performance,
    Development,
    Behavioral,
    Project,
    Learning,
}

string_enum!(GoalCategory {
    Performance => "performance",
    Development => "development",
    Behavioral => "behavioral",
    Project => "project",
    Learning => "learning",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalPriority {
    Low,
    Medium,
    High,
    Critical,
}

string_enum!(GoalPriority {
    Low => "low",
    Medium => "medium",
    High => "high",
    Critical => "critical",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    NotStarted,
    InProgress,
    Completed,
    Overdue,
    Cancelled,
}

string_enum!(GoalStatus {
    NotStarted => "not_started",
    InProgress => "in_progress",
    Completed => "completed",
    Overdue => "overdue",
    Cancelled => "cancelled",
});

impl GoalStatus {
    /// Terminal states are not subject to overdue tracking.
    pub fn is_closed(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub uuid: GoalId,
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    pub category: GoalCategory,
    pub priority: GoalPriority,
    pub status: GoalStatus,
    pub progress: u8,
    /// Unix epoch milliseconds.
    pub due_date: Option<i64>,
    pub tags: Vec<String>,
    pub template_id: Option<TemplateId>,
}

impl Goal {
    pub fn new(owner_id: UserId, title: impl Into<String>, category: GoalCategory) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            owner_id,
            title: title.into(),
            description: String::new(),
            category,
            priority: GoalPriority::Medium,
            status: GoalStatus::NotStarted,
            progress: 0,
            due_date: None,
            tags: Vec::new(),
            template_id: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        validate_progress(self.progress)?;
        if self.progress == MAX_PROGRESS && self.status != GoalStatus::Completed {
            return Err(ValidationError::invalid(
                "status",
                "goal at 100% progress must be completed",
            ));
        }
        Ok(())
    }

    /// Sets progress and derives the resulting status.
    pub fn apply_progress(&mut self, progress: u8) -> Result<(), ValidationError> {
        validate_progress(progress)?;
        if self.status == GoalStatus::Cancelled {
            return Err(ValidationError::invalid(
                "status",
                "cancelled goals do not accept progress",
            ));
        }

        self.progress = progress;
        self.status = match (progress, self.status) {
            (MAX_PROGRESS, _) => GoalStatus::Completed,
            (0, GoalStatus::Completed) => GoalStatus::NotStarted,
            (_, GoalStatus::Completed) | (_, GoalStatus::NotStarted) if progress > 0 => {
                GoalStatus::InProgress
            }
            (_, current) => current,
        };
        Ok(())
    }

    /// Marks an open goal past its due date as `Overdue`. Returns whether it changed.
    pub fn refresh_overdue(&mut self, now_epoch_ms: i64) -> bool {
        match self.due_date {
            Some(due) if due < now_epoch_ms && !self.status.is_closed() => {
                let changed = self.status != GoalStatus::Overdue;
                self.status = GoalStatus::Overdue;
                changed
            }
            _ => false,
        }
    }

    pub fn set_tags(&mut self, tags: &[String]) {
        self.tags = normalize_tags(tags);
    }
}

fn validate_progress(progress: u8) -> Result<(), ValidationError> {
    if progress > MAX_PROGRESS {
        return Err(ValidationError::invalid(
            "progress",
            format!("must be within 0..=100, got {progress}"),
        ));
    }
    Ok(())
}

/// Reusable goal blueprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalTemplate {
    pub uuid: TemplateId,
    pub name: String,
    pub description: String,
    pub category: GoalCategory,
    pub default_priority: GoalPriority,
    pub tags: Vec<String>,
}

impl GoalTemplate {
    pub fn new(name: impl Into<String>, category: GoalCategory) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            category,
            default_priority: GoalPriority::Medium,
            tags: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)
    }

    /// Creates a fresh, not-started goal for `owner_id` from this template.
    pub fn instantiate(&self, owner_id: UserId) -> Goal {
        let mut goal = Goal::new(owner_id, self.name.clone(), self.category);
        goal.description = self.description.clone();
        goal.priority = self.default_priority;
        goal.tags = normalize_tags(&self.tags);
        goal.template_id = Some(self.uuid);
        goal
    }
}

/// Supporting material attached to a goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub uuid: EvidenceId,
    pub goal_id: GoalId,
    pub title: String,
    pub description: String,
    pub link: Option<String>,
    pub submitted_by: UserId,
    /// Unix epoch milliseconds, assigned by storage.
    pub created_at: i64,
}

impl Evidence {
    pub fn new(goal_id: GoalId, submitted_by: UserId, title: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            goal_id,
            title: title.into(),
            description: String::new(),
            link: None,
            submitted_by,
            created_at: 0,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        if let Some(link) = &self.link {
            if !(link.starts_with("http://") || link.starts_with("https://")) {
                return Err(ValidationError::invalid("link", "expected http(s) URL"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Goal, GoalCategory, GoalPriority, GoalStatus, GoalTemplate};
    use uuid::Uuid;

    #[test]
    fn progress_drives_status() {
        let mut goal = Goal::new(Uuid::new_v4(), "Ship", GoalCategory::Project);
        goal.apply_progress(40).expect("valid progress");
        assert_eq!(goal.status, GoalStatus::InProgress);

        goal.apply_progress(100).expect("valid progress");
        assert_eq!(goal.status, GoalStatus::Completed);

        goal.apply_progress(80).expect("reopen");
        assert_eq!(goal.status, GoalStatus::InProgress);

        goal.apply_progress(0).expect("reset");
        assert_eq!(goal.status, GoalStatus::InProgress);
    }

    #[test]
    fn progress_out_of_range_and_cancelled_are_rejected() {
        let mut goal = Goal::new(Uuid::new_v4(), "Ship", GoalCategory::Project);
        assert!(goal.apply_progress(101).is_err());
        assert_eq!(goal.progress, 0);

        goal.status = GoalStatus::Cancelled;
        assert!(goal.apply_progress(10).is_err());
    }

    #[test]
    fn overdue_only_applies_to_open_goals() {
        let mut goal = Goal::new(Uuid::new_v4(), "Ship", GoalCategory::Project);
        goal.due_date = Some(1_000);
        assert!(goal.refresh_overdue(2_000));
        assert!(!goal.refresh_overdue(3_000));
        assert_eq!(goal.status, GoalStatus::Overdue);

        let mut done = Goal::new(Uuid::new_v4(), "Done", GoalCategory::Learning);
        done.due_date = Some(1_000);
        done.apply_progress(100).expect("complete");
        assert!(!done.refresh_overdue(2_000));
    }

    #[test]
    fn template_instantiates_fresh_goal() {
        let mut template = GoalTemplate::new("Mentor a peer", GoalCategory::Development);
        template.default_priority = GoalPriority::High;
        template.tags = vec!["Mentoring".to_string(), "mentoring".to_string()];

        let owner = Uuid::new_v4();
        let goal = template.instantiate(owner);
        assert_eq!(goal.owner_id, owner);
        assert_eq!(goal.priority, GoalPriority::High);
        assert_eq!(goal.status, GoalStatus::NotStarted);
        assert_eq!(goal.tags, vec!["mentoring"]);
        assert_eq!(goal.template_id, Some(template.uuid));
    }

    #[test]
    fn enum_strings_round_trip() {
        for status in GoalStatus::ALL {
            assert_eq!(GoalStatus::parse(status.as_str()), Some(*status));
        }
        assert_eq!(GoalCategory::parse("bogus"), None);
    }
}
