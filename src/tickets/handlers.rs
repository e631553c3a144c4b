// HTTP handlers for ticket endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::auth::middleware::AuthenticatedUser;
use crate::auth::models::Role;
use crate::tickets::{
    AssignTicketRequest, CreateTicketRequest, Ticket, TicketError, TicketStatus,
    UpdateTicketStatusRequest,
};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TicketListQuery {
    pub status: Option<TicketStatus>,
}

/// Open a support ticket
/// POST /api/customer/tickets
pub async fn create_ticket_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<Ticket>), TicketError> {
    request
        .validate()
        .map_err(|e| TicketError::ValidationError(e.to_string()))?;

    let ticket = state
        .ticket_service
        .create_ticket(user.tenancy_id, user.user_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(ticket)))
}

/// Tickets opened by the authenticated customer
/// GET /api/customer/tickets
pub async fn my_tickets_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Ticket>>, TicketError> {
    let tickets = state
        .ticket_service
        .customer_tickets(user.tenancy_id, user.user_id)
        .await?;

    Ok(Json(tickets))
}

/// GET /api/customer/tickets/{id}
pub async fn get_ticket_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(ticket_id): Path<i32>,
) -> Result<Json<Ticket>, TicketError> {
    let is_staff = user.role != Role::Customer;
    let ticket = state
        .ticket_service
        .get_ticket(user.tenancy_id, ticket_id, user.user_id, is_staff)
        .await?;

    Ok(Json(ticket))
}

/// Tenancy-wide ticket list
/// GET /api/staff/tickets
pub async fn list_tickets_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<TicketListQuery>,
) -> Result<Json<Vec<Ticket>>, TicketError> {
    let tickets = state
        .ticket_service
        .tenancy_tickets(user.tenancy_id, query.status)
        .await?;

    Ok(Json(tickets))
}

/// PATCH /api/staff/tickets/{id}/status
pub async fn update_ticket_status_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(ticket_id): Path<i32>,
    Json(request): Json<UpdateTicketStatusRequest>,
) -> Result<Json<Ticket>, TicketError> {
    let ticket = state
        .ticket_service
        .update_status(user.tenancy_id, ticket_id, request.status)
        .await?;

    Ok(Json(ticket))
}

/// PATCH /api/staff/tickets/{id}/assign
pub async fn assign_ticket_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(ticket_id): Path<i32>,
    Json(request): Json<AssignTicketRequest>,
) -> Result<Json<Ticket>, TicketError> {
    let ticket = state
        .ticket_service
        .assign_ticket(user.tenancy_id, ticket_id, request.assignee_id)
        .await?;

    Ok(Json(ticket))
}
