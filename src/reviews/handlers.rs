// HTTP handlers for review endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::auth::middleware::AuthenticatedUser;
use crate::reviews::{
    CreateReviewRequest, ModerateReviewRequest, ReviewError, ReviewResponse,
};
use crate::AppState;

/// Create a review for a delivered order
/// POST /api/customer/reviews
pub async fn create_review_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), ReviewError> {
    request
        .validate()
        .map_err(|e| ReviewError::ValidationError(e.to_string()))?;

    let review = state
        .review_service
        .create_review(user.tenancy_id, user.user_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(review.into())))
}

/// Approved reviews for a branch
/// GET /api/branches/{id}/reviews
pub async fn branch_reviews_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(branch_id): Path<i32>,
) -> Result<Json<Vec<ReviewResponse>>, ReviewError> {
    let reviews = state
        .review_service
        .branch_reviews(user.tenancy_id, branch_id)
        .await?;

    Ok(Json(reviews.into_iter().map(|r| r.into()).collect()))
}

/// Reviews awaiting moderation
/// GET /api/staff/reviews/pending
pub async fn pending_reviews_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<ReviewResponse>>, ReviewError> {
    let reviews = state.review_service.pending_reviews(user.tenancy_id).await?;
    Ok(Json(reviews.into_iter().map(|r| r.into()).collect()))
}

/// Approve or reject a review
/// PATCH /api/staff/reviews/{id}/moderate
pub async fn moderate_review_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(review_id): Path<i32>,
    Json(request): Json<ModerateReviewRequest>,
) -> Result<Json<ReviewResponse>, ReviewError> {
    let review = state
        .review_service
        .moderate_review(user.tenancy_id, review_id, request.status)
        .await?;

    Ok(Json(review.into()))
}
