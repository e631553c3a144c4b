use sqlx::PgPool;
use uuid::Uuid;

use crate::tickets::{Ticket, TicketError, TicketPriority, TicketStatus};

const TICKET_COLUMNS: &str = "id, tenancy_id, customer_id, order_id, subject, body, \
     priority, status, assigned_to, created_at, updated_at";

/// Repository for database operations on tickets
#[derive(Clone)]
pub struct TicketRepository {
    pool: PgPool,
}

impl TicketRepository {
    /// Create a new TicketRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a new ticket
    pub async fn create(
        &self,
        tenancy_id: Uuid,
        customer_id: i32,
        subject: &str,
        body: &str,
        priority: TicketPriority,
        order_id: Option<Uuid>,
    ) -> Result<Ticket, TicketError> {
        let ticket = sqlx::query_as::<_, Ticket>(&format!(
            "INSERT INTO tickets (tenancy_id, customer_id, subject, body, priority, order_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {TICKET_COLUMNS}"
        ))
        .bind(tenancy_id)
        .bind(customer_id)
        .bind(subject)
        .bind(body)
        .bind(priority)
        .bind(order_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(ticket)
    }

    /// Find a ticket by ID within a tenancy
    pub async fn find_by_id(&self, tenancy_id: Uuid, id: i32) -> Result<Option<Ticket>, TicketError> {
        let ticket = sqlx::query_as::<_, Ticket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE tenancy_id = $1 AND id = $2"
        ))
        .bind(tenancy_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(ticket)
    }

    /// Tickets opened by a customer
    pub async fn list_for_customer(
        &self,
        tenancy_id: Uuid,
        customer_id: i32,
    ) -> Result<Vec<Ticket>, TicketError> {
        let tickets = sqlx::query_as::<_, Ticket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets
             WHERE tenancy_id = $1 AND customer_id = $2
             ORDER BY created_at DESC"
        ))
        .bind(tenancy_id)
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tickets)
    }

    /// Tickets across the tenancy with optional status filter (staff view)
    pub async fn list_for_tenancy(
        &self,
        tenancy_id: Uuid,
        status: Option<TicketStatus>,
    ) -> Result<Vec<Ticket>, TicketError> {
        let tickets = match status {
            Some(status_filter) => {
                sqlx::query_as::<_, Ticket>(&format!(
                    "SELECT {TICKET_COLUMNS} FROM tickets
                     WHERE tenancy_id = $1 AND status = $2
                     ORDER BY created_at DESC"
                ))
                .bind(tenancy_id)
                .bind(status_filter)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Ticket>(&format!(
                    "SELECT {TICKET_COLUMNS} FROM tickets
                     WHERE tenancy_id = $1
                     ORDER BY created_at DESC"
                ))
                .bind(tenancy_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(tickets)
    }

    /// Update ticket status
    pub async fn update_status(
        &self,
        tenancy_id: Uuid,
        id: i32,
        status: TicketStatus,
    ) -> Result<Ticket, TicketError> {
        let ticket = sqlx::query_as::<_, Ticket>(&format!(
            "UPDATE tickets SET status = $3, updated_at = NOW()
             WHERE tenancy_id = $1 AND id = $2
             RETURNING {TICKET_COLUMNS}"
        ))
        .bind(tenancy_id)
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(TicketError::NotFound)?;

        Ok(ticket)
    }

    /// Assign a ticket to a staff member
    pub async fn assign(
        &self,
        tenancy_id: Uuid,
        id: i32,
        assignee_id: i32,
    ) -> Result<Ticket, TicketError> {
        let ticket = sqlx::query_as::<_, Ticket>(&format!(
            "UPDATE tickets SET assigned_to = $3, updated_at = NOW()
             WHERE tenancy_id = $1 AND id = $2
             RETURNING {TICKET_COLUMNS}"
        ))
        .bind(tenancy_id)
        .bind(id)
        .bind(assignee_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(TicketError::NotFound)?;

        Ok(ticket)
    }

    /// Check a user exists in the tenancy with a staff-or-above role
    pub async fn is_staff_member(
        &self,
        tenancy_id: Uuid,
        user_id: i32,
    ) -> Result<bool, TicketError> {
        let row: Option<(i32,)> = sqlx::query_as(
            "SELECT id FROM users
             WHERE tenancy_id = $1 AND id = $2 AND role IN ('staff', 'admin')",
        )
        .bind(tenancy_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }
}
