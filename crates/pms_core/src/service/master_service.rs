//! Master data use-cases for departments, domains and projects.
//!
//! # Invariants
//! - Writes require ADMIN or HR; reads are open to every role.
//! - A project's `domain_code`, when set, must name an active domain.

use crate::model::master::{normalize_code, MasterId, MasterKind, MasterRecord};
use crate::model::ValidationError;
use crate::repo::master_repo::MasterRepository;
use crate::service::{Actor, ServiceError, ServiceResult, PEOPLE_OPS};
use log::info;

/// Input for creating or editing one master record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MasterInput {
    pub code: String,
    pub name: String,
    pub description: String,
    pub employee_count: u32,
    pub domain_code: Option<String>,
}

pub struct MasterService<R: MasterRepository> {
    repo: R,
}

impl<R: MasterRepository> MasterService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create(
        &self,
        actor: &Actor,
        kind: MasterKind,
        input: MasterInput,
    ) -> ServiceResult<MasterRecord> {
        actor.require("edit master data", PEOPLE_OPS)?;

        let mut record = MasterRecord::new(kind, &input.code, input.name.trim());
        record.description = input.description.trim().to_string();
        record.employee_count = input.employee_count;
        record.domain_code = input.domain_code.as_deref().map(normalize_code);
        self.ensure_domain_exists(&record)?;

        self.repo.create_master(&record)?;
        info!(
            "event=master_create module=service status=ok kind={} actor_role={}",
            kind.as_str(),
            actor.role
        );
        Ok(record)
    }

    pub fn update(
        &self,
        actor: &Actor,
        id: MasterId,
        input: MasterInput,
    ) -> ServiceResult<MasterRecord> {
        actor.require("edit master data", PEOPLE_OPS)?;

        let mut record = self.get(id)?;
        record.code = normalize_code(&input.code);
        record.name = input.name.trim().to_string();
        record.description = input.description.trim().to_string();
        record.employee_count = input.employee_count;
        record.domain_code = input.domain_code.as_deref().map(normalize_code);
        self.ensure_domain_exists(&record)?;

        self.repo.update_master(&record)?;
        Ok(record)
    }

    pub fn get(&self, id: MasterId) -> ServiceResult<MasterRecord> {
        self.repo
            .get_master(id)?
            .ok_or_else(|| ServiceError::NotFound {
                entity: "master",
                id: id.to_string(),
            })
    }

    pub fn get_by_code(&self, kind: MasterKind, code: &str) -> ServiceResult<MasterRecord> {
        self.repo
            .get_by_code(kind, code)?
            .ok_or_else(|| ServiceError::NotFound {
                entity: kind.as_str(),
                id: normalize_code(code),
            })
    }

    pub fn list(&self, kind: MasterKind, active_only: bool) -> ServiceResult<Vec<MasterRecord>> {
        Ok(self.repo.list_masters(kind, active_only)?)
    }

    pub fn set_active(&self, actor: &Actor, id: MasterId, active: bool) -> ServiceResult<()> {
        actor.require("edit master data", PEOPLE_OPS)?;
        self.repo.set_active(id, active)?;
        Ok(())
    }

    /// Sum of hand-entered `employee_count` over active records of `kind`.
    pub fn total_headcount(&self, kind: MasterKind) -> ServiceResult<u64> {
        Ok(self
            .repo
            .list_masters(kind, true)?
            .iter()
            .map(|record| u64::from(record.employee_count))
            .sum())
    }

    fn ensure_domain_exists(&self, record: &MasterRecord) -> ServiceResult<()> {
        let Some(domain_code) = record.domain_code.as_deref() else {
            return Ok(());
        };
        match self.repo.get_by_code(MasterKind::Domain, domain_code)? {
            Some(domain) if domain.is_active => Ok(()),
            _ => Err(ServiceError::Validation(ValidationError::invalid(
                "domain_code",
                format!("no active domain with code `{domain_code}`"),
            ))),
        }
    }
}
