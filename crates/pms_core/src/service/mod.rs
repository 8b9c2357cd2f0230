//! Use-case services over repository contracts.
//!
//! # Responsibility
//! - Enforce role gates and workflow rules before persistence.
//! - Keep services storage-agnostic; they only see repository traits.
//!
//! # Invariants
//! - Every mutating use-case takes the acting identity explicitly.
//! - Repository semantic errors surface as matching service errors.

use crate::auth::store::SessionUser;
use crate::model::review::InvalidTransition;
use crate::model::role::Role;
use crate::model::user::UserId;
use crate::model::ValidationError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod bulk_service;
pub mod goal_service;
pub mod master_service;
pub mod review_service;
pub mod user_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    Validation(ValidationError),
    NotFound {
        entity: &'static str,
        id: String,
    },
    Duplicate {
        entity: &'static str,
        field: &'static str,
        value: String,
    },
    Forbidden {
        action: &'static str,
        role: Role,
    },
    InvalidTransition(InvalidTransition),
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Duplicate {
                entity,
                field,
                value,
            } => write!(f, "{entity} with {field} `{value}` already exists"),
            Self::Forbidden { action, role } => write!(f, "role {role} may not {action}"),
            Self::InvalidTransition(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::InvalidTransition(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            RepoError::Duplicate {
                entity,
                field,
                value,
            } => Self::Duplicate {
                entity,
                field,
                value,
            },
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<InvalidTransition> for ServiceError {
    fn from(value: InvalidTransition) -> Self {
        Self::InvalidTransition(value)
    }
}

/// Identity on whose behalf a use-case runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    /// Fails with `Forbidden` unless the actor holds one of `allowed`.
    pub fn require(&self, action: &'static str, allowed: &[Role]) -> ServiceResult<()> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden {
                action,
                role: self.role,
            })
        }
    }
}

impl From<&SessionUser> for Actor {
    fn from(user: &SessionUser) -> Self {
        Self::new(user.id, user.role)
    }
}

pub(crate) const PEOPLE_OPS: &[Role] = &[Role::Admin, Role::Hr];
pub(crate) const MANAGERS_AND_UP: &[Role] = &[Role::Admin, Role::Hr, Role::Manager];
pub(crate) const LEADS_AND_UP: &[Role] = &[Role::Admin, Role::Hr, Role::Manager, Role::Teamlead];
