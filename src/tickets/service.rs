use uuid::Uuid;

use crate::tickets::{
    CreateTicketRequest, Ticket, TicketError, TicketRepository, TicketStatus, TicketStatusMachine,
};

/// Service for ticket business logic
#[derive(Clone)]
pub struct TicketService {
    repository: TicketRepository,
}

impl TicketService {
    /// Create a new TicketService
    pub fn new(repository: TicketRepository) -> Self {
        Self { repository }
    }

    /// Open a ticket for a customer
    pub async fn create_ticket(
        &self,
        tenancy_id: Uuid,
        customer_id: i32,
        request: CreateTicketRequest,
    ) -> Result<Ticket, TicketError> {
        self.repository
            .create(
                tenancy_id,
                customer_id,
                &request.subject,
                &request.body,
                request.priority,
                request.order_id,
            )
            .await
    }

    /// Tickets the customer opened
    pub async fn customer_tickets(
        &self,
        tenancy_id: Uuid,
        customer_id: i32,
    ) -> Result<Vec<Ticket>, TicketError> {
        self.repository
            .list_for_customer(tenancy_id, customer_id)
            .await
    }

    /// Tenancy-wide ticket list (staff view)
    pub async fn tenancy_tickets(
        &self,
        tenancy_id: Uuid,
        status: Option<TicketStatus>,
    ) -> Result<Vec<Ticket>, TicketError> {
        self.repository.list_for_tenancy(tenancy_id, status).await
    }

    /// Fetch a single ticket; customers may only read their own
    pub async fn get_ticket(
        &self,
        tenancy_id: Uuid,
        ticket_id: i32,
        requester_id: i32,
        is_staff: bool,
    ) -> Result<Ticket, TicketError> {
        let ticket = self
            .repository
            .find_by_id(tenancy_id, ticket_id)
            .await?
            .ok_or(TicketError::NotFound)?;

        if !is_staff && ticket.customer_id != requester_id {
            return Err(TicketError::Forbidden(
                "You do not have permission to access this ticket".to_string(),
            ));
        }

        Ok(ticket)
    }

    /// Transition a ticket through its lifecycle
    pub async fn update_status(
        &self,
        tenancy_id: Uuid,
        ticket_id: i32,
        new_status: TicketStatus,
    ) -> Result<Ticket, TicketError> {
        let ticket = self
            .repository
            .find_by_id(tenancy_id, ticket_id)
            .await?
            .ok_or(TicketError::NotFound)?;

        TicketStatusMachine::transition(ticket.status, new_status)
            .map_err(TicketError::InvalidTransition)?;

        self.repository
            .update_status(tenancy_id, ticket_id, new_status)
            .await
    }

    /// Assign a ticket to a staff member in the same tenancy
    pub async fn assign_ticket(
        &self,
        tenancy_id: Uuid,
        ticket_id: i32,
        assignee_id: i32,
    ) -> Result<Ticket, TicketError> {
        if !self
            .repository
            .is_staff_member(tenancy_id, assignee_id)
            .await?
        {
            return Err(TicketError::InvalidAssignee);
        }

        self.repository
            .assign(tenancy_id, ticket_id, assignee_id)
            .await
    }
}
