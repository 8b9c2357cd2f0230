//! User management use-cases.
//!
//! # Invariants
//! - Only ADMIN/HR create, re-role or (de)activate users.
//! - HR cannot grant the ADMIN role.
//! - Nobody deactivates their own account.
//! - Non people-ops callers only list their direct reports.

use crate::model::role::Role;
use crate::model::user::{User, UserId};
use crate::repo::user_repo::{UserListQuery, UserRepository};
use crate::service::{Actor, ServiceError, ServiceResult, PEOPLE_OPS};
use log::info;

/// Input for creating one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRequest {
    pub employee_id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub department: Option<String>,
    pub domain: Option<String>,
    pub project: Option<String>,
    pub manager_id: Option<UserId>,
}

/// Partial profile update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfileUpdate {
    pub name: Option<String>,
    pub department: Option<String>,
    pub domain: Option<String>,
    pub project: Option<String>,
    pub manager_id: Option<UserId>,
}

pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_user(&self, actor: &Actor, request: NewUserRequest) -> ServiceResult<User> {
        actor.require("create users", PEOPLE_OPS)?;
        ensure_can_grant(actor, request.role)?;

        let mut user = User::new(
            request.employee_id.trim(),
            request.name.trim(),
            request.email.trim(),
            request.role,
        );
        user.department = non_blank(request.department);
        user.domain = non_blank(request.domain);
        user.project = non_blank(request.project);
        user.manager_id = request.manager_id;

        self.repo.create_user(&user)?;
        info!(
            "event=user_create module=service status=ok role={} actor_role={}",
            user.role, actor.role
        );
        Ok(user)
    }

    pub fn get_user(&self, id: UserId) -> ServiceResult<User> {
        self.repo
            .get_user(id)?
            .ok_or_else(|| ServiceError::NotFound {
                entity: "user",
                id: id.to_string(),
            })
    }

    /// Lists users visible to `actor`.
    pub fn list_users(&self, actor: &Actor, query: &UserListQuery) -> ServiceResult<Vec<User>> {
        if PEOPLE_OPS.contains(&actor.role) {
            return Ok(self.repo.list_users(query)?);
        }
        let scoped = UserListQuery {
            manager_id: Some(actor.id),
            ..query.clone()
        };
        Ok(self.repo.list_users(&scoped)?)
    }

    /// Active direct reports of `manager_id`.
    pub fn team_of(&self, manager_id: UserId) -> ServiceResult<Vec<User>> {
        Ok(self.repo.list_all_users(&UserListQuery {
            manager_id: Some(manager_id),
            active_only: true,
            ..UserListQuery::default()
        })?)
    }

    pub fn update_role(&self, actor: &Actor, id: UserId, role: Role) -> ServiceResult<User> {
        actor.require("change user roles", PEOPLE_OPS)?;
        ensure_can_grant(actor, role)?;

        let mut user = self.get_user(id)?;
        if user.role == Role::Admin && actor.role != Role::Admin {
            return Err(ServiceError::Forbidden {
                action: "change an admin's role",
                role: actor.role,
            });
        }
        user.role = role;
        self.repo.update_user(&user)?;
        info!(
            "event=user_role_update module=service status=ok role={} actor_role={}",
            role, actor.role
        );
        Ok(user)
    }

    /// People ops may edit anyone; other users may only rename themselves.
    pub fn update_profile(
        &self,
        actor: &Actor,
        id: UserId,
        update: UserProfileUpdate,
    ) -> ServiceResult<User> {
        let is_self = actor.id == id;
        let touches_org_fields = update.department.is_some()
            || update.domain.is_some()
            || update.project.is_some()
            || update.manager_id.is_some();
        if !PEOPLE_OPS.contains(&actor.role) && (!is_self || touches_org_fields) {
            return Err(ServiceError::Forbidden {
                action: "edit this profile",
                role: actor.role,
            });
        }

        let mut user = self.get_user(id)?;
        if let Some(name) = update.name {
            user.name = name.trim().to_string();
        }
        if let Some(department) = update.department {
            user.department = non_blank(Some(department));
        }
        if let Some(domain) = update.domain {
            user.domain = non_blank(Some(domain));
        }
        if let Some(project) = update.project {
            user.project = non_blank(Some(project));
        }
        if let Some(manager_id) = update.manager_id {
            user.manager_id = Some(manager_id);
        }
        self.repo.update_user(&user)?;
        Ok(user)
    }

    pub fn set_active(&self, actor: &Actor, id: UserId, active: bool) -> ServiceResult<()> {
        actor.require("activate or deactivate users", PEOPLE_OPS)?;
        if actor.id == id && !active {
            return Err(ServiceError::Forbidden {
                action: "deactivate their own account",
                role: actor.role,
            });
        }
        self.repo.set_active(id, active)?;
        info!(
            "event=user_set_active module=service status=ok active={} actor_role={}",
            active, actor.role
        );
        Ok(())
    }
}

fn ensure_can_grant(actor: &Actor, role: Role) -> ServiceResult<()> {
    if role == Role::Admin && actor.role != Role::Admin {
        return Err(ServiceError::Forbidden {
            action: "grant the ADMIN role",
            role: actor.role,
        });
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
