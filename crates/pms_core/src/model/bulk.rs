//! Simulated bulk operation model.
//!
//! # Invariants
//! - `progress` stays within `0..=100`; reaching 100 completes the job.
//! - `processed_items == total_items * progress / 100` (integer division).
//! - `Completed`, `Failed` and `Cancelled` jobs ignore further ticks.

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type BulkOperationId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkOperationKind {
    ImportUsers,
    ExportReport,
    AssignGoals,
    SendReminders,
}

impl BulkOperationKind {
    pub const ALL: [BulkOperationKind; 4] = [
        Self::ImportUsers,
        Self::ExportReport,
        Self::AssignGoals,
        Self::SendReminders,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ImportUsers => "import_users",
            Self::ExportReport => "export_report",
            Self::AssignGoals => "assign_goals",
            Self::SendReminders => "send_reminders",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkOperationStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl BulkOperationStatus {
    pub const ALL: [BulkOperationStatus; 5] = [
        Self::Pending,
        Self::Running,
        Self::Completed,
        Self::Failed,
        Self::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }

    pub fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOperation {
    pub uuid: BulkOperationId,
    pub kind: BulkOperationKind,
    pub status: BulkOperationStatus,
    pub progress: u8,
    pub total_items: u32,
    pub processed_items: u32,
    pub created_by: UserId,
}

impl BulkOperation {
    pub fn new(kind: BulkOperationKind, total_items: u32, created_by: UserId) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            kind,
            status: BulkOperationStatus::Pending,
            progress: 0,
            total_items,
            processed_items: 0,
            created_by,
        }
    }

    /// Advances progress by `increment` percentage points, saturating at 100.
    ///
    /// Returns `false` when nothing changed: the job was already finished or
    /// `increment` is zero.
    pub fn advance(&mut self, increment: u8) -> bool {
        if self.status.is_finished() || increment == 0 {
            return false;
        }
        self.progress = self.progress.saturating_add(increment).min(100);
        self.processed_items = processed_for(self.total_items, self.progress);
        self.status = if self.progress == 100 {
            BulkOperationStatus::Completed
        } else {
            BulkOperationStatus::Running
        };
        true
    }

    /// Cancels an unfinished job. Returns whether the status changed.
    pub fn cancel(&mut self) -> bool {
        if self.status.is_finished() {
            return false;
        }
        self.status = BulkOperationStatus::Cancelled;
        true
    }
}

fn processed_for(total_items: u32, progress: u8) -> u32 {
    let processed = u64::from(total_items) * u64::from(progress) / 100;
    u32::try_from(processed).unwrap_or(total_items)
}
