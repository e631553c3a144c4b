// HTTP handlers for benefit administration
//
// All endpoints are admin-only (enforced by router middleware) and
// tenancy-scoped through the authenticated user's claims.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthenticatedUser;
use crate::benefits::{
    error::BenefitError,
    models::{
        AutomaticDiscount, Campaign, Coupon, CreateCampaignRequest, CreateCouponRequest,
        CreateDiscountRequest, UpdateDiscountRequest,
    },
};
use crate::AppState;

#[derive(Debug, serde::Deserialize)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

/// Create an automatic discount
/// POST /api/admin/discounts
pub async fn create_discount_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateDiscountRequest>,
) -> Result<(StatusCode, Json<AutomaticDiscount>), BenefitError> {
    request.validate()?;

    let discount = state
        .benefit_repository
        .create_discount(user.tenancy_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(discount)))
}

/// List every discount configured for the tenancy
/// GET /api/admin/discounts
pub async fn list_discounts_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<AutomaticDiscount>>, BenefitError> {
    let discounts = state.benefit_repository.list_discounts(user.tenancy_id).await?;
    Ok(Json(discounts))
}

/// GET /api/admin/discounts/{id}
pub async fn get_discount_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<AutomaticDiscount>, BenefitError> {
    let discount = state
        .benefit_repository
        .find_discount(user.tenancy_id, id)
        .await?
        .ok_or_else(|| BenefitError::NotFound {
            resource: "discount".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(discount))
}

/// PATCH /api/admin/discounts/{id}
pub async fn update_discount_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateDiscountRequest>,
) -> Result<Json<AutomaticDiscount>, BenefitError> {
    request.validate()?;

    let discount = state
        .benefit_repository
        .update_discount(user.tenancy_id, id, request)
        .await?;

    Ok(Json(discount))
}

/// DELETE /api/admin/discounts/{id}
pub async fn delete_discount_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, BenefitError> {
    state
        .benefit_repository
        .delete_discount(user.tenancy_id, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Create a campaign for the checkout trigger
/// POST /api/admin/campaigns
pub async fn create_campaign_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateCampaignRequest>,
) -> Result<(StatusCode, Json<Campaign>), BenefitError> {
    request.validate()?;

    let campaign = state
        .benefit_repository
        .create_campaign(user.tenancy_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(campaign)))
}

/// GET /api/admin/campaigns
pub async fn list_campaigns_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Campaign>>, BenefitError> {
    let campaigns = state.benefit_repository.list_campaigns(user.tenancy_id).await?;
    Ok(Json(campaigns))
}

/// GET /api/admin/campaigns/{id}
///
/// Includes the analytics counters (used_count, spent_amount, unique_users)
pub async fn get_campaign_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Campaign>, BenefitError> {
    let campaign = state
        .benefit_repository
        .find_campaign(user.tenancy_id, id)
        .await?
        .ok_or_else(|| BenefitError::NotFound {
            resource: "campaign".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(campaign))
}

/// PATCH /api/admin/campaigns/{id}/active
pub async fn set_campaign_active_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<SetActiveRequest>,
) -> Result<Json<Campaign>, BenefitError> {
    let campaign = state
        .benefit_repository
        .set_campaign_active(user.tenancy_id, id, request.is_active)
        .await?;

    Ok(Json(campaign))
}

/// DELETE /api/admin/campaigns/{id}
pub async fn delete_campaign_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, BenefitError> {
    state
        .benefit_repository
        .delete_campaign(user.tenancy_id, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Create a coupon
/// POST /api/admin/coupons
pub async fn create_coupon_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateCouponRequest>,
) -> Result<(StatusCode, Json<Coupon>), BenefitError> {
    request.validate()?;

    let coupon = state
        .benefit_repository
        .create_coupon(user.tenancy_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(coupon)))
}

/// GET /api/admin/coupons
pub async fn list_coupons_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Coupon>>, BenefitError> {
    let coupons = state.benefit_repository.list_coupons(user.tenancy_id).await?;
    Ok(Json(coupons))
}

/// PATCH /api/admin/coupons/{id}/active
pub async fn set_coupon_active_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<SetActiveRequest>,
) -> Result<Json<Coupon>, BenefitError> {
    let coupon = state
        .benefit_repository
        .set_coupon_active(user.tenancy_id, id, request.is_active)
        .await?;

    Ok(Json(coupon))
}

/// DELETE /api/admin/coupons/{id}
pub async fn delete_coupon_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, BenefitError> {
    state
        .benefit_repository
        .delete_coupon(user.tenancy_id, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
