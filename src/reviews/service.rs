use uuid::Uuid;

use crate::orders::{OrderStatus, OrdersRepository};
use crate::reviews::{
    CreateReviewRequest, RatingCalculator, Review, ReviewError, ReviewRepository, ReviewStatus,
};

/// Service for review business logic
#[derive(Clone)]
pub struct ReviewService {
    repository: ReviewRepository,
    orders_repo: OrdersRepository,
    rating_calculator: RatingCalculator,
}

impl ReviewService {
    /// Create a new ReviewService
    pub fn new(
        repository: ReviewRepository,
        orders_repo: OrdersRepository,
        rating_calculator: RatingCalculator,
    ) -> Self {
        Self {
            repository,
            orders_repo,
            rating_calculator,
        }
    }

    /// Create a review for a delivered order
    ///
    /// The order must belong to the reviewer, be delivered, and not have
    /// been reviewed before. The review starts in pending moderation.
    pub async fn create_review(
        &self,
        tenancy_id: Uuid,
        customer_id: i32,
        request: CreateReviewRequest,
    ) -> Result<Review, ReviewError> {
        let order = self
            .orders_repo
            .find_by_id(tenancy_id, request.order_id)
            .await
            .map_err(|_| ReviewError::OrderNotFound)?
            .ok_or(ReviewError::OrderNotFound)?;

        if order.customer_id != customer_id {
            return Err(ReviewError::Forbidden(
                "You can only review your own orders".to_string(),
            ));
        }
        if order.status != OrderStatus::Delivered {
            return Err(ReviewError::OrderNotDelivered);
        }
        if self
            .repository
            .find_by_order(tenancy_id, request.order_id)
            .await?
            .is_some()
        {
            return Err(ReviewError::DuplicateReview);
        }

        self.repository
            .create(
                tenancy_id,
                request.order_id,
                customer_id,
                order.branch_id,
                request.rating,
                request.comment,
            )
            .await
    }

    /// Approved reviews for a branch (public listing)
    pub async fn branch_reviews(
        &self,
        tenancy_id: Uuid,
        branch_id: i32,
    ) -> Result<Vec<Review>, ReviewError> {
        self.repository
            .list_for_branch(tenancy_id, branch_id, Some(ReviewStatus::Approved))
            .await
    }

    /// Reviews awaiting moderation (staff view)
    pub async fn pending_reviews(&self, tenancy_id: Uuid) -> Result<Vec<Review>, ReviewError> {
        self.repository.list_pending(tenancy_id).await
    }

    /// Moderate a review and recompute the branch aggregate
    ///
    /// Approving adds the rating to the branch average; rejecting a
    /// previously approved review removes it. The recompute runs on any
    /// decision since it derives entirely from the approved set.
    pub async fn moderate_review(
        &self,
        tenancy_id: Uuid,
        review_id: i32,
        status: ReviewStatus,
    ) -> Result<Review, ReviewError> {
        if status == ReviewStatus::Pending {
            return Err(ReviewError::ValidationError(
                "Moderation must set approved or rejected".to_string(),
            ));
        }

        let review = self
            .repository
            .set_status(tenancy_id, review_id, status)
            .await?;

        self.rating_calculator
            .recalculate_branch(tenancy_id, review.branch_id)
            .await?;

        Ok(review)
    }
}
