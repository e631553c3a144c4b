// Customer notifications
//
// Fire-and-forget: a notification failure must never affect the request
// that triggered it. The current transport is the structured log; the
// dispatch seam is where a real push/SMS provider would plug in.

use tracing::info;

use crate::orders::{Order, OrderStatus};

#[derive(Debug, Clone)]
pub enum Notification {
    OrderCreated {
        order_id: uuid::Uuid,
        customer_id: i32,
        total: rust_decimal::Decimal,
    },
    OrderStatusChanged {
        order_id: uuid::Uuid,
        customer_id: i32,
        from: OrderStatus,
        to: OrderStatus,
    },
}

/// Dispatches customer notifications off the request path
#[derive(Clone)]
pub struct Notifier;

impl Notifier {
    pub fn new() -> Self {
        Self
    }

    /// Notify the customer their order was received
    pub fn order_created(&self, order: &Order) {
        self.dispatch(Notification::OrderCreated {
            order_id: order.id,
            customer_id: order.customer_id,
            total: order.total_price,
        });
    }

    /// Notify the customer their order moved to a new status
    pub fn order_status_changed(&self, order: &Order, previous: OrderStatus) {
        self.dispatch(Notification::OrderStatusChanged {
            order_id: order.id,
            customer_id: order.customer_id,
            from: previous,
            to: order.status,
        });
    }

    fn dispatch(&self, notification: Notification) {
        tokio::spawn(async move {
            match notification {
                Notification::OrderCreated {
                    order_id,
                    customer_id,
                    total,
                } => {
                    info!(
                        "Notifying customer {} that order {} was received (total {})",
                        customer_id, order_id, total
                    );
                }
                Notification::OrderStatusChanged {
                    order_id,
                    customer_id,
                    from,
                    to,
                } => {
                    info!(
                        "Notifying customer {} that order {} moved from {} to {}",
                        customer_id, order_id, from, to
                    );
                }
            }
        });
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
