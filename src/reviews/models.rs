use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Moderation status of a review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Domain model representing a customer review of a delivered order
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: i32,
    pub tenancy_id: Uuid,
    pub order_id: Uuid,
    pub customer_id: i32,
    pub branch_id: i32,
    pub rating: i16,
    pub comment: Option<String>,
    pub status: ReviewStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for creating a review
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    pub order_id: Uuid,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i16,
    #[validate(length(max = 500, message = "Comment must be at most 500 characters"))]
    pub comment: Option<String>,
}

/// Request DTO for moderating a review
#[derive(Debug, Deserialize)]
pub struct ModerateReviewRequest {
    pub status: ReviewStatus,
}

/// Response DTO for a review
#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub id: i32,
    pub order_id: Uuid,
    pub customer_id: i32,
    pub branch_id: i32,
    pub rating: i16,
    pub comment: Option<String>,
    pub status: ReviewStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            order_id: review.order_id,
            customer_id: review.customer_id,
            branch_id: review.branch_id,
            rating: review.rating,
            comment: review.comment,
            status: review.status,
            created_at: review.created_at,
            updated_at: review.updated_at,
        }
    }
}
