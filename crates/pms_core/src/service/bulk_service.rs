//! Simulated bulk operations.
//!
//! # Responsibility
//! - Start, advance, cancel and inspect long-running jobs.
//! - Progress is simulated; no items are actually processed.
//!
//! # Invariants
//! - Only ADMIN/HR start or cancel jobs.
//! - A finished job never changes again.

use crate::model::bulk::{BulkOperation, BulkOperationId, BulkOperationKind};
use crate::repo::bulk_repo::BulkOperationRepository;
use crate::service::{Actor, ServiceError, ServiceResult, PEOPLE_OPS};
use log::info;
use uuid::Uuid;

/// Source of per-tick progress increments.
pub trait ProgressTicker {
    /// Percentage points to add on this tick.
    fn next_increment(&mut self) -> u8;
}

/// Random increment in `1..=15`, drawn from v4 UUID entropy.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomTicker;

pub const MIN_RANDOM_INCREMENT: u8 = 1;
pub const MAX_RANDOM_INCREMENT: u8 = 15;

impl ProgressTicker for RandomTicker {
    fn next_increment(&mut self) -> u8 {
        let span = MAX_RANDOM_INCREMENT - MIN_RANDOM_INCREMENT + 1;
        MIN_RANDOM_INCREMENT + Uuid::new_v4().as_bytes()[0] % span
    }
}

/// Constant increment, for deterministic runs.
#[derive(Debug, Clone, Copy)]
pub struct FixedTicker(pub u8);

impl ProgressTicker for FixedTicker {
    fn next_increment(&mut self) -> u8 {
        self.0
    }
}

pub struct BulkOperationService<R: BulkOperationRepository> {
    repo: R,
}

impl<R: BulkOperationRepository> BulkOperationService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn start(
        &self,
        actor: &Actor,
        kind: BulkOperationKind,
        total_items: u32,
    ) -> ServiceResult<BulkOperation> {
        actor.require("run bulk operations", PEOPLE_OPS)?;
        let operation = BulkOperation::new(kind, total_items, actor.id);
        self.repo.create_operation(&operation)?;
        info!(
            "event=bulk_start module=service status=ok kind={} total_items={}",
            kind.as_str(),
            total_items
        );
        Ok(operation)
    }

    /// Advances one job by the ticker's next increment.
    pub fn tick(
        &self,
        id: BulkOperationId,
        ticker: &mut dyn ProgressTicker,
    ) -> ServiceResult<BulkOperation> {
        let mut operation = self.get(id)?;
        if operation.advance(ticker.next_increment()) {
            self.repo.update_operation(&operation)?;
            if operation.status.is_finished() {
                info!(
                    "event=bulk_finish module=service status=ok kind={} processed_items={}",
                    operation.kind.as_str(),
                    operation.processed_items
                );
            }
        }
        Ok(operation)
    }

    /// Ticks until the job finishes or a tick makes no progress.
    pub fn run_to_completion(
        &self,
        id: BulkOperationId,
        ticker: &mut dyn ProgressTicker,
    ) -> ServiceResult<BulkOperation> {
        let mut last_progress = self.get(id)?.progress;
        loop {
            let operation = self.tick(id, ticker)?;
            if operation.status.is_finished() || operation.progress == last_progress {
                return Ok(operation);
            }
            last_progress = operation.progress;
        }
    }

    pub fn cancel(&self, actor: &Actor, id: BulkOperationId) -> ServiceResult<BulkOperation> {
        actor.require("cancel bulk operations", PEOPLE_OPS)?;
        let mut operation = self.get(id)?;
        if operation.cancel() {
            self.repo.update_operation(&operation)?;
            info!(
                "event=bulk_cancel module=service status=ok kind={} progress={}",
                operation.kind.as_str(),
                operation.progress
            );
        }
        Ok(operation)
    }

    pub fn get(&self, id: BulkOperationId) -> ServiceResult<BulkOperation> {
        self.repo
            .get_operation(id)?
            .ok_or_else(|| ServiceError::NotFound {
                entity: "bulk operation",
                id: id.to_string(),
            })
    }

    pub fn list(&self, limit: Option<u32>) -> ServiceResult<Vec<BulkOperation>> {
        Ok(self.repo.list_operations(limit)?)
    }
}
