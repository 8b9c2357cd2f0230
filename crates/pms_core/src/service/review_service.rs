//! Review workflow use-cases.
//!
//! # Invariants
//! - Drafts are opened by TEAMLEAD and above, who become the reviewer.
//! - Only the reviewed employee submits the self review.
//! - Only the assigned reviewer submits the manager review.
//! - Completing or returning is allowed to the reviewer and to ADMIN/HR.
//! - Status changes always go through `next_status`.

use crate::model::review::{
    next_status, validate_rating, Review, ReviewAction, ReviewId, ReviewStatus,
};
use crate::model::user::UserId;
use crate::repo::review_repo::{ReviewListQuery, ReviewRepository};
use crate::service::{Actor, ServiceError, ServiceResult, LEADS_AND_UP, PEOPLE_OPS};
use log::info;

pub struct ReviewService<R: ReviewRepository> {
    repo: R,
}

impl<R: ReviewRepository> ReviewService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Opens a draft review of `employee_id` for `cycle`, reviewed by `actor`.
    pub fn create_draft(
        &self,
        actor: &Actor,
        employee_id: UserId,
        cycle: &str,
    ) -> ServiceResult<Review> {
        actor.require("open reviews", LEADS_AND_UP)?;
        let review = Review::new(employee_id, actor.id, cycle.trim());
        self.repo.create_review(&review)?;
        info!(
            "event=review_create module=service status=ok cycle={} actor_role={}",
            review.cycle, actor.role
        );
        Ok(review)
    }

    pub fn get_review(&self, id: ReviewId) -> ServiceResult<Review> {
        self.repo
            .get_review(id)?
            .ok_or_else(|| ServiceError::NotFound {
                entity: "review",
                id: id.to_string(),
            })
    }

    pub fn submit_self(
        &self,
        actor: &Actor,
        id: ReviewId,
        rating: u8,
        comment: &str,
    ) -> ServiceResult<Review> {
        let mut review = self.get_review(id)?;
        if review.employee_id != actor.id {
            return Err(forbidden("submit another user's self review", actor));
        }
        validate_rating("self_rating", rating)?;

        review.status = next_status(review.status, ReviewAction::SubmitSelf)?;
        review.self_rating = Some(rating);
        review.self_comment = non_blank(comment);
        self.save(&review, ReviewAction::SubmitSelf)?;
        Ok(review)
    }

    pub fn submit_manager(
        &self,
        actor: &Actor,
        id: ReviewId,
        rating: u8,
        comment: &str,
    ) -> ServiceResult<Review> {
        let mut review = self.get_review(id)?;
        if review.reviewer_id != actor.id {
            return Err(forbidden("review an employee they are not assigned to", actor));
        }
        validate_rating("manager_rating", rating)?;

        review.status = next_status(review.status, ReviewAction::SubmitManager)?;
        review.manager_rating = Some(rating);
        review.manager_comment = non_blank(comment);
        self.save(&review, ReviewAction::SubmitManager)?;
        Ok(review)
    }

    pub fn complete(&self, actor: &Actor, id: ReviewId) -> ServiceResult<Review> {
        self.apply_oversight(actor, id, ReviewAction::Complete)
    }

    /// Sends the review back to draft. The self review is cleared for resubmission.
    pub fn return_to_draft(&self, actor: &Actor, id: ReviewId) -> ServiceResult<Review> {
        self.apply_oversight(actor, id, ReviewAction::Return)
    }

    pub fn list_reviews(&self, query: &ReviewListQuery) -> ServiceResult<Vec<Review>> {
        Ok(self.repo.list_reviews(query)?)
    }

    /// Every review matching `query`, across all pages.
    pub fn list_all_reviews(&self, query: &ReviewListQuery) -> ServiceResult<Vec<Review>> {
        Ok(self.repo.list_all_reviews(query)?)
    }

    /// Reviews where `actor` is the employee or the reviewer; everything for ADMIN/HR.
    pub fn list_visible(&self, actor: &Actor, cycle: Option<&str>) -> ServiceResult<Vec<Review>> {
        let base = ReviewListQuery {
            cycle: cycle.map(str::to_string),
            ..ReviewListQuery::default()
        };
        if PEOPLE_OPS.contains(&actor.role) {
            return self.list_all_reviews(&base);
        }

        let mut reviews = self.list_all_reviews(&ReviewListQuery {
            employee_id: Some(actor.id),
            ..base.clone()
        })?;
        reviews.extend(self.list_all_reviews(&ReviewListQuery {
            reviewer_id: Some(actor.id),
            ..base
        })?);
        Ok(reviews)
    }

    /// Counts reviews per status, in workflow order.
    pub fn status_counts(&self, cycle: Option<&str>) -> ServiceResult<Vec<(ReviewStatus, usize)>> {
        let reviews = self.list_all_reviews(&ReviewListQuery {
            cycle: cycle.map(str::to_string),
            ..ReviewListQuery::default()
        })?;
        Ok(ReviewStatus::ALL
            .iter()
            .map(|status| {
                let count = reviews.iter().filter(|r| r.status == *status).count();
                (*status, count)
            })
            .collect())
    }

    fn apply_oversight(
        &self,
        actor: &Actor,
        id: ReviewId,
        action: ReviewAction,
    ) -> ServiceResult<Review> {
        let mut review = self.get_review(id)?;
        if review.reviewer_id != actor.id {
            actor.require("oversee this review", PEOPLE_OPS)?;
        }
        review.status = next_status(review.status, action)?;
        if action == ReviewAction::Return {
            review.self_rating = None;
            review.self_comment = None;
        }
        self.save(&review, action)?;
        Ok(review)
    }

    fn save(&self, review: &Review, action: ReviewAction) -> ServiceResult<()> {
        self.repo.update_review(review)?;
        info!(
            "event=review_transition module=service status=ok action={} review_status={}",
            action.as_str(),
            review.status.as_str()
        );
        Ok(())
    }
}

fn forbidden(action: &'static str, actor: &Actor) -> ServiceError {
    ServiceError::Forbidden {
        action,
        role: actor.role,
    }
}

fn non_blank(comment: &str) -> Option<String> {
    let trimmed = comment.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
