use sqlx::PgPool;
use uuid::Uuid;

use crate::reviews::{Review, ReviewError, ReviewStatus};

const REVIEW_COLUMNS: &str = "id, tenancy_id, order_id, customer_id, branch_id, rating, \
     comment, status, created_at, updated_at";

/// Repository for database operations on reviews
#[derive(Clone)]
pub struct ReviewRepository {
    pool: PgPool,
}

impl ReviewRepository {
    /// Create a new ReviewRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new review in pending status
    pub async fn create(
        &self,
        tenancy_id: Uuid,
        order_id: Uuid,
        customer_id: i32,
        branch_id: i32,
        rating: i16,
        comment: Option<String>,
    ) -> Result<Review, ReviewError> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "INSERT INTO reviews (tenancy_id, order_id, customer_id, branch_id, rating, comment)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(tenancy_id)
        .bind(order_id)
        .bind(customer_id)
        .bind(branch_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => ReviewError::DuplicateReview,
            _ => ReviewError::DatabaseError(e),
        })?;

        Ok(review)
    }

    /// Find a review by ID within a tenancy
    pub async fn find_by_id(&self, tenancy_id: Uuid, id: i32) -> Result<Option<Review>, ReviewError> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE tenancy_id = $1 AND id = $2"
        ))
        .bind(tenancy_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(review)
    }

    /// Find the review for an order, if one exists
    pub async fn find_by_order(
        &self,
        tenancy_id: Uuid,
        order_id: Uuid,
    ) -> Result<Option<Review>, ReviewError> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE tenancy_id = $1 AND order_id = $2"
        ))
        .bind(tenancy_id)
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(review)
    }

    /// List reviews for a branch, optionally filtered by moderation status
    pub async fn list_for_branch(
        &self,
        tenancy_id: Uuid,
        branch_id: i32,
        status: Option<ReviewStatus>,
    ) -> Result<Vec<Review>, ReviewError> {
        let reviews = match status {
            Some(status_filter) => {
                sqlx::query_as::<_, Review>(&format!(
                    "SELECT {REVIEW_COLUMNS} FROM reviews
                     WHERE tenancy_id = $1 AND branch_id = $2 AND status = $3
                     ORDER BY created_at DESC"
                ))
                .bind(tenancy_id)
                .bind(branch_id)
                .bind(status_filter)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Review>(&format!(
                    "SELECT {REVIEW_COLUMNS} FROM reviews
                     WHERE tenancy_id = $1 AND branch_id = $2
                     ORDER BY created_at DESC"
                ))
                .bind(tenancy_id)
                .bind(branch_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(reviews)
    }

    /// List reviews pending moderation across the tenancy
    pub async fn list_pending(&self, tenancy_id: Uuid) -> Result<Vec<Review>, ReviewError> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews
             WHERE tenancy_id = $1 AND status = 'pending'
             ORDER BY created_at ASC"
        ))
        .bind(tenancy_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    /// Set the moderation status of a review
    pub async fn set_status(
        &self,
        tenancy_id: Uuid,
        id: i32,
        status: ReviewStatus,
    ) -> Result<Review, ReviewError> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "UPDATE reviews SET status = $3, updated_at = NOW()
             WHERE tenancy_id = $1 AND id = $2
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(tenancy_id)
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ReviewError::NotFound)?;

        Ok(review)
    }

    /// Approved ratings for a branch, for the aggregate recompute
    pub async fn approved_ratings_for_branch(
        &self,
        tenancy_id: Uuid,
        branch_id: i32,
    ) -> Result<Vec<i16>, ReviewError> {
        let ratings: Vec<(i16,)> = sqlx::query_as(
            "SELECT rating FROM reviews
             WHERE tenancy_id = $1 AND branch_id = $2 AND status = 'approved'",
        )
        .bind(tenancy_id)
        .bind(branch_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ratings.into_iter().map(|r| r.0).collect())
    }

    /// Write the recomputed aggregate onto the branch
    pub async fn update_branch_rating(
        &self,
        tenancy_id: Uuid,
        branch_id: i32,
        rating: Option<f64>,
        count: i32,
    ) -> Result<(), ReviewError> {
        sqlx::query(
            "UPDATE branches SET rating = $3, review_count = $4
             WHERE tenancy_id = $1 AND id = $2",
        )
        .bind(tenancy_id)
        .bind(branch_id)
        .bind(rating)
        .bind(count)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
