//! Performance review workflow model.
//!
//! # Invariants
//! - Status moves `Draft -> SelfSubmitted -> ManagerReviewed -> Completed`.
//! - Only `Draft`/`SelfSubmitted` reviews can be returned, and they go back
//!   to `Draft` with the self rating and self comment cleared.
//! - Ratings are within `1..=5`.
//! - One review per employee per cycle.

use crate::model::user::UserId;
use crate::model::{require_text, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ReviewId = Uuid;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Draft,
    SelfSubmitted,
    ManagerReviewed,
    Completed,
}

impl ReviewStatus {
    pub const ALL: [ReviewStatus; 4] = [
        Self::Draft,
        Self::SelfSubmitted,
        Self::ManagerReviewed,
        Self::Completed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::SelfSubmitted => "self_submitted",
            Self::ManagerReviewed => "manager_reviewed",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }
}

/// Workflow actions applied to a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    SubmitSelf,
    SubmitManager,
    Complete,
    Return,
}

impl ReviewAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SubmitSelf => "submit_self",
            Self::SubmitManager => "submit_manager",
            Self::Complete => "complete",
            Self::Return => "return",
        }
    }
}

/// Rejected workflow transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: ReviewStatus,
    pub action: ReviewAction,
}

impl Display for InvalidTransition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "cannot {} a review in status `{}`",
            self.action.as_str(),
            self.from.as_str()
        )
    }
}

impl std::error::Error for InvalidTransition {}

/// Returns the status reached by applying `action` in `from`.
pub fn next_status(
    from: ReviewStatus,
    action: ReviewAction,
) -> Result<ReviewStatus, InvalidTransition> {
    use ReviewAction as A;
    use ReviewStatus as S;

    match (from, action) {
        (S::Draft, A::SubmitSelf) => Ok(S::SelfSubmitted),
        (S::SelfSubmitted, A::SubmitManager) => Ok(S::ManagerReviewed),
        (S::ManagerReviewed, A::Complete) => Ok(S::Completed),
        (S::Draft | S::SelfSubmitted, A::Return) => Ok(S::Draft),
        _ => Err(InvalidTransition { from, action }),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub uuid: ReviewId,
    pub employee_id: UserId,
    pub reviewer_id: UserId,
    /// Free-form cycle label such as `2024-Q1`.
    pub cycle: String,
    pub status: ReviewStatus,
    pub self_rating: Option<u8>,
    pub manager_rating: Option<u8>,
    pub self_comment: Option<String>,
    pub manager_comment: Option<String>,
}

impl Review {
    pub fn new(employee_id: UserId, reviewer_id: UserId, cycle: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            employee_id,
            reviewer_id,
            cycle: cycle.into(),
            status: ReviewStatus::Draft,
            self_rating: None,
            manager_rating: None,
            self_comment: None,
            manager_comment: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("cycle", &self.cycle)?;
        if self.employee_id == self.reviewer_id {
            return Err(ValidationError::invalid(
                "reviewer_id",
                "employees cannot review themselves",
            ));
        }
        for (field, rating) in [
            ("self_rating", self.self_rating),
            ("manager_rating", self.manager_rating),
        ] {
            if let Some(value) = rating {
                validate_rating(field, value)?;
            }
        }
        Ok(())
    }
}

pub fn validate_rating(field: &'static str, rating: u8) -> Result<(), ValidationError> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(ValidationError::invalid(
            field,
            format!("must be within {MIN_RATING}..={MAX_RATING}, got {rating}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{next_status, validate_rating, ReviewAction, ReviewStatus};

    #[test]
    fn happy_path_reaches_completed() {
        let mut status = ReviewStatus::Draft;
        for action in [
            ReviewAction::SubmitSelf,
            ReviewAction::SubmitManager,
            ReviewAction::Complete,
        ] {
            status = next_status(status, action).expect("legal transition");
        }
        assert_eq!(status, ReviewStatus::Completed);
    }

    #[test]
    fn illegal_transitions_are_rejected() {
        let err = next_status(ReviewStatus::Draft, ReviewAction::Complete)
            .expect_err("draft cannot complete");
        assert_eq!(err.from, ReviewStatus::Draft);
        assert!(err.to_string().contains("complete"));

        assert!(next_status(ReviewStatus::Completed, ReviewAction::Return).is_err());
        assert!(next_status(ReviewStatus::ManagerReviewed, ReviewAction::Return).is_err());
        assert_eq!(
            next_status(ReviewStatus::SelfSubmitted, ReviewAction::Return),
            Ok(ReviewStatus::Draft)
        );
    }

    #[test]
    fn ratings_are_bounded() {
        assert!(validate_rating("self_rating", 0).is_err());
        assert!(validate_rating("self_rating", 6).is_err());
        assert!(validate_rating("self_rating", 3).is_ok());
    }
}
