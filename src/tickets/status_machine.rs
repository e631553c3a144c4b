use crate::tickets::TicketStatus;

/// Service for managing ticket status transitions
pub struct TicketStatusMachine;

impl TicketStatusMachine {
    /// Check if a status transition is valid
    ///
    /// # Valid Transitions
    /// - Open → InProgress, Resolved
    /// - InProgress → Resolved, Open
    /// - Resolved → Closed, Open (reopen)
    /// - Closed → (terminal)
    /// - Any status → Same status (idempotent)
    pub fn is_valid_transition(from: TicketStatus, to: TicketStatus) -> bool {
        if from == to {
            return true;
        }

        match (from, to) {
            (TicketStatus::Open, TicketStatus::InProgress) => true,
            (TicketStatus::Open, TicketStatus::Resolved) => true,

            (TicketStatus::InProgress, TicketStatus::Resolved) => true,
            (TicketStatus::InProgress, TicketStatus::Open) => true,

            (TicketStatus::Resolved, TicketStatus::Closed) => true,
            // Reopen
            (TicketStatus::Resolved, TicketStatus::Open) => true,

            (TicketStatus::Closed, _) => false,

            _ => false,
        }
    }

    /// Attempt to transition from one status to another
    pub fn transition(from: TicketStatus, to: TicketStatus) -> Result<TicketStatus, String> {
        if Self::is_valid_transition(from, to) {
            Ok(to)
        } else {
            Err(format!("Invalid ticket transition from {} to {}", from, to))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATUSES: [TicketStatus; 4] = [
        TicketStatus::Open,
        TicketStatus::InProgress,
        TicketStatus::Resolved,
        TicketStatus::Closed,
    ];

    #[test]
    fn test_happy_path() {
        assert!(TicketStatusMachine::is_valid_transition(
            TicketStatus::Open,
            TicketStatus::InProgress
        ));
        assert!(TicketStatusMachine::is_valid_transition(
            TicketStatus::InProgress,
            TicketStatus::Resolved
        ));
        assert!(TicketStatusMachine::is_valid_transition(
            TicketStatus::Resolved,
            TicketStatus::Closed
        ));
    }

    #[test]
    fn test_reopen_from_resolved() {
        assert!(TicketStatusMachine::is_valid_transition(
            TicketStatus::Resolved,
            TicketStatus::Open
        ));
    }

    #[test]
    fn test_closed_is_terminal() {
        for status in ALL_STATUSES {
            if status != TicketStatus::Closed {
                assert!(!TicketStatusMachine::is_valid_transition(
                    TicketStatus::Closed,
                    status
                ));
            }
        }
    }

    #[test]
    fn test_cannot_skip_to_closed() {
        assert!(!TicketStatusMachine::is_valid_transition(
            TicketStatus::Open,
            TicketStatus::Closed
        ));
        assert!(!TicketStatusMachine::is_valid_transition(
            TicketStatus::InProgress,
            TicketStatus::Closed
        ));
    }

    #[test]
    fn test_self_transitions_idempotent() {
        for status in ALL_STATUSES {
            assert!(TicketStatusMachine::is_valid_transition(status, status));
        }
    }
}
