use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Lifecycle status of a support ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Resolved => "resolved",
            TicketStatus::Closed => "closed",
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ticket priority level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TicketPriority {
    Low,
    Normal,
    High,
    Urgent,
}

impl Default for TicketPriority {
    fn default() -> Self {
        TicketPriority::Normal
    }
}

/// Domain model representing a support ticket
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub id: i32,
    pub tenancy_id: Uuid,
    pub customer_id: i32,
    pub order_id: Option<Uuid>,
    pub subject: String,
    pub body: String,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    pub assigned_to: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for opening a ticket
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTicketRequest {
    #[validate(length(min = 1, max = 200, message = "Subject must be 1-200 characters"))]
    pub subject: String,
    #[validate(length(min = 1, max = 4000, message = "Body must be 1-4000 characters"))]
    pub body: String,
    #[serde(default)]
    pub priority: TicketPriority,
    pub order_id: Option<Uuid>,
}

/// Request DTO for a ticket status change
#[derive(Debug, Deserialize)]
pub struct UpdateTicketStatusRequest {
    pub status: TicketStatus,
}

/// Request DTO for assigning a ticket to a staff member
#[derive(Debug, Deserialize)]
pub struct AssignTicketRequest {
    pub assignee_id: i32,
}
