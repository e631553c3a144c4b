// HTTP handlers for order endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthenticatedUser;
use crate::orders::{
    CreateOrderRequest, OrderError, OrderResponse, OrderStatus, UpdatePaymentRequest,
    UpdateStatusRequest,
};

/// Query parameters for order history
#[derive(Debug, Deserialize)]
pub struct OrderHistoryQuery {
    /// Optional status filter
    pub status: Option<OrderStatus>,
}

/// Handler for POST /api/customer/orders
/// Runs the full checkout pipeline for the authenticated customer
pub async fn create_order_handler(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), OrderError> {
    request
        .validate()
        .map_err(|e| OrderError::ValidationError(e.to_string()))?;

    let order = state
        .order_service
        .create_order(user.tenancy_id, user.user_id, request)
        .await?;

    let items = state.order_items_repo.find_by_order_id(order.id).await?;
    let response = OrderResponse::from_parts(order, items);

    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET /api/customer/orders
/// Order history for the authenticated customer
pub async fn order_history_handler(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Query(query): Query<OrderHistoryQuery>,
) -> Result<Json<Vec<OrderResponse>>, OrderError> {
    let orders = state
        .order_service
        .get_customer_orders(user.tenancy_id, user.user_id, query.status)
        .await?;

    Ok(Json(orders))
}

/// Handler for GET /api/customer/orders/{id}
pub async fn get_order_handler(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderResponse>, OrderError> {
    let order = state
        .order_service
        .get_order_by_id(user.tenancy_id, order_id, user.user_id, user.role)
        .await?;

    Ok(Json(order))
}

/// Handler for GET /api/staff/orders
/// Tenancy-wide order list for staff
pub async fn list_tenancy_orders_handler(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Query(query): Query<OrderHistoryQuery>,
) -> Result<Json<Vec<OrderResponse>>, OrderError> {
    let orders = state
        .order_service
        .get_tenancy_orders(user.tenancy_id, query.status)
        .await?;

    Ok(Json(orders))
}

/// Handler for PATCH /api/staff/orders/{id}/status
pub async fn update_status_handler(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(order_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>, OrderError> {
    let order = state
        .order_service
        .update_order_status(user.tenancy_id, order_id, request.status)
        .await?;

    let items = state.order_items_repo.find_by_order_id(order.id).await?;
    Ok(Json(OrderResponse::from_parts(order, items)))
}

/// Handler for PATCH /api/staff/orders/{id}/payment
pub async fn update_payment_handler(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(order_id): Path<Uuid>,
    Json(request): Json<UpdatePaymentRequest>,
) -> Result<Json<OrderResponse>, OrderError> {
    let order = state
        .order_service
        .update_payment_status(user.tenancy_id, order_id, request.payment_status)
        .await?;

    let items = state.order_items_repo.find_by_order_id(order.id).await?;
    Ok(Json(OrderResponse::from_parts(order, items)))
}
