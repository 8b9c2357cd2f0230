//! Client auth store: persisted session state and mock credential checks.
//!
//! # Responsibility
//! - Hold the current user and authentication flag.
//! - Persist the auth record under a fixed storage key.
//! - Re-validate the persisted record on a background interval.
//!
//! # Invariants
//! - Credentials and tokens never appear in log lines.
//! - A failed login leaves the store logged out.
//! - Logout removes the persisted record entirely.
//! - Tokens are opaque and never exchanged with a server.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod credentials;
pub mod monitor;
pub mod store;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug)]
pub enum AuthError {
    /// Email or password is empty after trimming.
    MissingCredentials,
    /// Credential check failed. Carries no detail about which part was wrong.
    InvalidCredentials,
    /// The matched account is deactivated.
    AccountDisabled,
    Storage(DbError),
    Serialization(serde_json::Error),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCredentials => write!(f, "Email and password are required"),
            Self::InvalidCredentials => write!(f, "Invalid email or password"),
            Self::AccountDisabled => write!(f, "This account has been deactivated"),
            Self::Storage(err) => write!(f, "auth storage failed: {err}"),
            Self::Serialization(err) => write!(f, "auth record encoding failed: {err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for AuthError {
    fn from(value: DbError) -> Self {
        Self::Storage(value)
    }
}

impl From<rusqlite::Error> for AuthError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}
