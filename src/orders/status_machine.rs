use crate::orders::{OrderStatus, PaymentStatus};

/// Service for managing order status transitions
pub struct StatusMachine;

impl StatusMachine {
    /// Check if a status transition is valid
    ///
    /// # Valid Transitions
    /// - Pending → PickedUp, Cancelled
    /// - PickedUp → Processing, Cancelled
    /// - Processing → Ready, Cancelled
    /// - Ready → OutForDelivery, Cancelled
    /// - OutForDelivery → Delivered, Cancelled
    /// - Delivered → Cancelled (refund scenario)
    /// - Cancelled → (no transitions allowed except to itself)
    /// - Any status → Same status (idempotent)
    pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
        // Same status is always valid (idempotent)
        if from == to {
            return true;
        }

        match (from, to) {
            (OrderStatus::Pending, OrderStatus::PickedUp) => true,
            (OrderStatus::Pending, OrderStatus::Cancelled) => true,

            (OrderStatus::PickedUp, OrderStatus::Processing) => true,
            (OrderStatus::PickedUp, OrderStatus::Cancelled) => true,

            (OrderStatus::Processing, OrderStatus::Ready) => true,
            (OrderStatus::Processing, OrderStatus::Cancelled) => true,

            (OrderStatus::Ready, OrderStatus::OutForDelivery) => true,
            (OrderStatus::Ready, OrderStatus::Cancelled) => true,

            (OrderStatus::OutForDelivery, OrderStatus::Delivered) => true,
            (OrderStatus::OutForDelivery, OrderStatus::Cancelled) => true,

            // Refund flow
            (OrderStatus::Delivered, OrderStatus::Cancelled) => true,

            // Cancelled is terminal (self-transition handled above)
            (OrderStatus::Cancelled, _) => false,

            _ => false,
        }
    }

    /// Attempt to transition from one status to another
    ///
    /// Returns `Ok(to)` if the transition is valid, `Err(message)` otherwise
    pub fn transition(from: OrderStatus, to: OrderStatus) -> Result<OrderStatus, String> {
        if Self::is_valid_transition(from, to) {
            Ok(to)
        } else {
            Err(format!("Invalid status transition from {} to {}", from, to))
        }
    }

    /// Check if a payment status transition is valid
    ///
    /// Unpaid → Paid, Paid → Refunded; refunds only from paid orders.
    pub fn is_valid_payment_transition(from: PaymentStatus, to: PaymentStatus) -> bool {
        if from == to {
            return true;
        }

        matches!(
            (from, to),
            (PaymentStatus::Unpaid, PaymentStatus::Paid)
                | (PaymentStatus::Paid, PaymentStatus::Refunded)
        )
    }

    /// Attempt a payment status transition
    pub fn payment_transition(
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> Result<PaymentStatus, String> {
        if Self::is_valid_payment_transition(from, to) {
            Ok(to)
        } else {
            Err(format!(
                "Invalid payment transition from {} to {}",
                from, to
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATUSES: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::PickedUp,
        OrderStatus::Processing,
        OrderStatus::Ready,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    #[test]
    fn test_happy_path_transitions() {
        let path = [
            OrderStatus::Pending,
            OrderStatus::PickedUp,
            OrderStatus::Processing,
            OrderStatus::Ready,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
        ];
        for pair in path.windows(2) {
            assert!(
                StatusMachine::is_valid_transition(pair[0], pair[1]),
                "{} -> {} should be valid",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_skipping_stages_invalid() {
        assert!(!StatusMachine::is_valid_transition(
            OrderStatus::Pending,
            OrderStatus::Processing
        ));
        assert!(!StatusMachine::is_valid_transition(
            OrderStatus::PickedUp,
            OrderStatus::Delivered
        ));
        assert!(!StatusMachine::is_valid_transition(
            OrderStatus::Ready,
            OrderStatus::Delivered
        ));
    }

    #[test]
    fn test_backward_transitions_invalid() {
        assert!(!StatusMachine::is_valid_transition(
            OrderStatus::Processing,
            OrderStatus::PickedUp
        ));
        assert!(!StatusMachine::is_valid_transition(
            OrderStatus::Delivered,
            OrderStatus::Ready
        ));
    }

    #[test]
    fn test_any_non_terminal_can_cancel() {
        for status in ALL_STATUSES {
            if status != OrderStatus::Cancelled {
                assert!(
                    StatusMachine::is_valid_transition(status, OrderStatus::Cancelled),
                    "{} -> cancelled should be valid",
                    status
                );
            }
        }
    }

    #[test]
    fn test_cancelled_is_terminal() {
        for status in ALL_STATUSES {
            if status != OrderStatus::Cancelled {
                assert!(!StatusMachine::is_valid_transition(
                    OrderStatus::Cancelled,
                    status
                ));
            }
        }
    }

    #[test]
    fn test_self_transitions_idempotent() {
        for status in ALL_STATUSES {
            assert!(StatusMachine::is_valid_transition(status, status));
        }
    }

    #[test]
    fn test_transition_returns_error_message() {
        let err = StatusMachine::transition(OrderStatus::Cancelled, OrderStatus::Pending)
            .unwrap_err();
        assert!(err.contains("cancelled"));
        assert!(err.contains("pending"));
    }

    #[test]
    fn test_payment_transitions() {
        assert!(StatusMachine::is_valid_payment_transition(
            PaymentStatus::Unpaid,
            PaymentStatus::Paid
        ));
        assert!(StatusMachine::is_valid_payment_transition(
            PaymentStatus::Paid,
            PaymentStatus::Refunded
        ));
        // Refund requires payment first
        assert!(!StatusMachine::is_valid_payment_transition(
            PaymentStatus::Unpaid,
            PaymentStatus::Refunded
        ));
        assert!(!StatusMachine::is_valid_payment_transition(
            PaymentStatus::Refunded,
            PaymentStatus::Paid
        ));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_status() -> impl Strategy<Value = OrderStatus> {
        prop_oneof![
            Just(OrderStatus::Pending),
            Just(OrderStatus::PickedUp),
            Just(OrderStatus::Processing),
            Just(OrderStatus::Ready),
            Just(OrderStatus::OutForDelivery),
            Just(OrderStatus::Delivered),
            Just(OrderStatus::Cancelled),
        ]
    }

    proptest! {
        /// Self-transitions are always valid
        #[test]
        fn prop_self_transition_valid(status in arb_status()) {
            prop_assert!(StatusMachine::is_valid_transition(status, status));
        }

        /// Cancelled never transitions to a different status
        #[test]
        fn prop_cancelled_terminal(to in arb_status()) {
            if to != OrderStatus::Cancelled {
                prop_assert!(!StatusMachine::is_valid_transition(OrderStatus::Cancelled, to));
            }
        }

        /// transition() agrees with is_valid_transition()
        #[test]
        fn prop_transition_consistency(from in arb_status(), to in arb_status()) {
            let valid = StatusMachine::is_valid_transition(from, to);
            prop_assert_eq!(StatusMachine::transition(from, to).is_ok(), valid);
        }
    }
}
