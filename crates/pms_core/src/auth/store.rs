//! Persisted auth store.
//!
//! # Invariants
//! - The persisted record lives under [`AUTH_STORAGE_KEY`] as camelCase JSON.
//! - In-memory state mirrors the persisted record after every mutation.
//! - A corrupt persisted record is removed and treated as logged out.

use crate::auth::credentials::CredentialVerifier;
use crate::auth::{AuthError, AuthResult};
use crate::db::kv::{kv_get, kv_remove, kv_set};
use crate::db::now_epoch_ms;
use crate::model::role::Role;
use crate::model::user::UserId;
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::repo::RepoError;
use log::{info, warn};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Fixed storage name of the persisted auth record.
pub const AUTH_STORAGE_KEY: &str = "pms-auth-storage";

/// Identity carried by an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: UserId,
    pub employee_id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub department: Option<String>,
}

/// Persisted auth record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRecord {
    pub user: Option<SessionUser>,
    pub is_authenticated: bool,
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    /// Unix epoch milliseconds.
    pub expires_at: Option<i64>,
}

impl AuthRecord {
    /// Returns why this record does not describe a live session, if it doesn't.
    pub fn invalid_reason(&self, now_epoch_ms: i64) -> Option<&'static str> {
        if !self.is_authenticated {
            return Some("flag_cleared");
        }
        if self.user.is_none() {
            return Some("missing_user");
        }
        if self.token.as_deref().map_or(true, str::is_empty) {
            return Some("missing_token");
        }
        match self.expires_at {
            Some(expires_at) if expires_at <= now_epoch_ms => Some("expired"),
            _ => None,
        }
    }
}

/// Outcome of one liveness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCheck {
    /// A live session is persisted.
    Valid,
    /// A persisted session was invalid and has been cleared.
    LoggedOut,
    /// Nothing was persisted.
    NoSession,
}

impl SessionCheck {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::LoggedOut => "logged_out",
            Self::NoSession => "no_session",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthSettings {
    pub session_ttl: Duration,
    /// Simulated latency applied before credential checks.
    pub login_delay: Duration,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            session_ttl: crate::config::DEFAULT_SESSION_TTL,
            login_delay: Duration::ZERO,
        }
    }
}

impl From<&crate::config::AppConfig> for AuthSettings {
    fn from(config: &crate::config::AppConfig) -> Self {
        Self {
            session_ttl: config.session_ttl,
            login_delay: config.login_delay,
        }
    }
}

/// Auth store bound to one connection.
pub struct AuthStore<'conn, V: CredentialVerifier> {
    conn: &'conn Connection,
    verifier: V,
    settings: AuthSettings,
    state: AuthRecord,
}

impl<'conn, V: CredentialVerifier> AuthStore<'conn, V> {
    /// Creates a store and rehydrates state from persistence.
    pub fn open(conn: &'conn Connection, verifier: V, settings: AuthSettings) -> AuthResult<Self> {
        let mut store = Self {
            conn,
            verifier,
            settings,
            state: AuthRecord::default(),
        };
        store.rehydrate()?;
        Ok(store)
    }

    /// Reloads state from persistence.
    pub fn rehydrate(&mut self) -> AuthResult<&AuthRecord> {
        self.state = load_record(self.conn)?.unwrap_or_default();
        Ok(&self.state)
    }

    pub fn state(&self) -> &AuthRecord {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated
    }

    pub fn current_user(&self) -> Option<&SessionUser> {
        self.state.user.as_ref()
    }

    /// Checks credentials and persists a fresh session on success.
    ///
    /// # Errors
    /// - `MissingCredentials` when either field is blank.
    /// - `InvalidCredentials` when the verifier rejects the pair.
    /// - `AccountDisabled` when the user directory marks the account inactive.
    pub fn login(&mut self, email: &str, password: &str) -> AuthResult<SessionUser> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            self.clear()?;
            return Err(AuthError::MissingCredentials);
        }

        if !self.settings.login_delay.is_zero() {
            std::thread::sleep(self.settings.login_delay);
        }

        let Some(verified) = self.verifier.verify(email, password) else {
            info!("event=auth_login module=auth status=error error_code=invalid_credentials");
            self.clear()?;
            return Err(AuthError::InvalidCredentials);
        };
        let user = match self.reconcile_with_directory(verified) {
            Ok(user) => user,
            Err(err) => {
                self.clear()?;
                return Err(err);
            }
        };

        let now = now_epoch_ms();
        let ttl_ms = i64::try_from(self.settings.session_ttl.as_millis()).unwrap_or(i64::MAX);
        let record = AuthRecord {
            user: Some(user.clone()),
            is_authenticated: true,
            token: Some(opaque_token("at")),
            refresh_token: Some(opaque_token("rt")),
            expires_at: Some(now.saturating_add(ttl_ms)),
        };
        save_record(self.conn, &record)?;
        self.state = record;

        info!(
            "event=auth_login module=auth status=ok role={} user_id={}",
            user.role, user.id
        );
        Ok(user)
    }

    /// Clears the persisted record and in-memory state.
    pub fn logout(&mut self) -> AuthResult<()> {
        self.clear()?;
        info!("event=auth_logout module=auth status=ok");
        Ok(())
    }

    /// Re-validates the persisted session, logging out when it is invalid.
    pub fn validate_session(&mut self, now_epoch_ms: i64) -> AuthResult<SessionCheck> {
        let check = check_persisted_session(self.conn, now_epoch_ms)?;
        if check != SessionCheck::Valid {
            self.state = AuthRecord::default();
        }
        Ok(check)
    }

    fn clear(&mut self) -> AuthResult<()> {
        kv_remove(self.conn, AUTH_STORAGE_KEY)?;
        self.state = AuthRecord::default();
        Ok(())
    }

    /// Prefers the user directory's view of the account when it exists.
    fn reconcile_with_directory(&self, verified: SessionUser) -> AuthResult<SessionUser> {
        let repo = SqliteUserRepository::new(self.conn);
        let directory_user = match repo.find_by_email(&verified.email) {
            Ok(user) => user,
            Err(RepoError::Db(err)) => return Err(AuthError::Storage(err)),
            Err(err) => {
                warn!(
                    "event=auth_login module=auth status=fallback reason=directory_unreadable error={err}"
                );
                None
            }
        };

        match directory_user {
            Some(user) if !user.is_active => {
                info!("event=auth_login module=auth status=error error_code=account_disabled");
                Err(AuthError::AccountDisabled)
            }
            Some(user) => Ok(SessionUser {
                id: user.uuid,
                employee_id: user.employee_id,
                name: user.name,
                email: user.email,
                role: user.role,
                department: user.department,
            }),
            None => Ok(verified),
        }
    }
}

/// Loads the persisted record. Corrupt JSON is removed and reported as `None`.
pub fn load_record(conn: &Connection) -> AuthResult<Option<AuthRecord>> {
    let Some(raw) = kv_get(conn, AUTH_STORAGE_KEY)? else {
        return Ok(None);
    };
    match serde_json::from_str::<AuthRecord>(&raw) {
        Ok(record) => Ok(Some(record)),
        Err(err) => {
            warn!(
                "event=auth_rehydrate module=auth status=fallback reason=corrupt_record line={} column={}",
                err.line(),
                err.column()
            );
            kv_remove(conn, AUTH_STORAGE_KEY)?;
            Ok(None)
        }
    }
}

/// Writes the record under [`AUTH_STORAGE_KEY`].
pub fn save_record(conn: &Connection, record: &AuthRecord) -> AuthResult<()> {
    let json = serde_json::to_string(record)?;
    kv_set(conn, AUTH_STORAGE_KEY, &json)?;
    Ok(())
}

/// Validates the persisted record and clears it when invalid.
pub fn check_persisted_session(conn: &Connection, now_epoch_ms: i64) -> AuthResult<SessionCheck> {
    let Some(record) = load_record(conn)? else {
        return Ok(SessionCheck::NoSession);
    };
    match record.invalid_reason(now_epoch_ms) {
        None => Ok(SessionCheck::Valid),
        Some(reason) => {
            kv_remove(conn, AUTH_STORAGE_KEY)?;
            info!("event=session_check module=auth status=logged_out reason={reason}");
            Ok(SessionCheck::LoggedOut)
        }
    }
}

fn opaque_token(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}
