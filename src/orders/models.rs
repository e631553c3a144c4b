use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;
use validator::Validate;

use crate::benefits::{AppliedCampaign, AppliedDiscount};
use crate::models::ServiceCategory;

/// Order status enum representing the laundry order lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    PickedUp,
    Processing,
    Ready,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Convert status to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::PickedUp => "picked_up",
            OrderStatus::Processing => "processing",
            OrderStatus::Ready => "ready",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Parse status from string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "picked_up" => Ok(OrderStatus::PickedUp),
            "processing" => Ok(OrderStatus::Processing),
            "ready" => Ok(OrderStatus::Ready),
            "out_for_delivery" => Ok(OrderStatus::OutForDelivery),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(format!("Invalid order status: {}", s)),
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment status enum representing the payment state of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "unpaid" => Ok(PaymentStatus::Unpaid),
            "paid" => Ok(PaymentStatus::Paid),
            "refunded" => Ok(PaymentStatus::Refunded),
            _ => Err(format!("Invalid payment status: {}", s)),
        }
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Unpaid
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Domain model representing an order with its embedded pricing breakdown
///
/// The breakdown columns are written once at creation and never
/// recalculated; they are the audit record of what the evaluator decided.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub tenancy_id: Uuid,
    pub customer_id: i32,
    pub branch_id: i32,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub subtotal: Decimal,
    pub automatic_discount: Decimal,
    pub applied_discounts: Json<Vec<AppliedDiscount>>,
    pub campaign_discount: Decimal,
    pub applied_campaign: Option<Json<AppliedCampaign>>,
    pub coupon_code: Option<String>,
    pub coupon_discount: Decimal,
    pub discount_total: Decimal,
    pub tax: Decimal,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Domain model representing a line within an order
///
/// `unit_price_snapshot` is captured from the service at creation time and
/// is immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: Uuid,
    pub service_id: i32,
    pub item_type: String,
    pub category: ServiceCategory,
    pub quantity: i32,
    pub unit_price_snapshot: Decimal,
    pub subtotal: Decimal,
}

/// Request DTO for a single order line
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderItemRequest {
    pub service_id: i32,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

/// Request DTO for creating a new order
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub branch_id: i32,
    #[validate(length(min = 1, message = "Order must contain at least one item"))]
    pub items: Vec<OrderItemRequest>,
    /// Optional coupon code; a present-but-blank code is rejected
    pub coupon_code: Option<String>,
}

/// Request DTO for updating order status
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// Request DTO for updating payment status
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePaymentRequest {
    pub payment_status: PaymentStatus,
}

/// Pricing breakdown block embedded in order responses
#[derive(Debug, Serialize)]
pub struct PricingBreakdown {
    pub subtotal: Decimal,
    pub automatic_discount: Decimal,
    pub applied_discounts: Vec<AppliedDiscount>,
    pub campaign_discount: Decimal,
    pub applied_campaign: Option<AppliedCampaign>,
    pub coupon_code: Option<String>,
    pub coupon_discount: Decimal,
    pub discount_total: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// Response DTO for order with items and pricing breakdown
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub customer_id: i32,
    pub branch_id: i32,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub pricing: PricingBreakdown,
    pub items: Vec<OrderItemResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderResponse {
    pub fn from_parts(order: Order, items: Vec<OrderItem>) -> Self {
        Self {
            id: order.id,
            customer_id: order.customer_id,
            branch_id: order.branch_id,
            status: order.status,
            payment_status: order.payment_status,
            pricing: PricingBreakdown {
                subtotal: order.subtotal,
                automatic_discount: order.automatic_discount,
                applied_discounts: order.applied_discounts.0,
                campaign_discount: order.campaign_discount,
                applied_campaign: order.applied_campaign.map(|c| c.0),
                coupon_code: order.coupon_code,
                coupon_discount: order.coupon_discount,
                discount_total: order.discount_total,
                tax: order.tax,
                total: order.total_price,
            },
            items: items.into_iter().map(|item| item.into()).collect(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

/// Response DTO for an order line
#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    pub id: i32,
    pub service_id: i32,
    pub item_type: String,
    pub category: ServiceCategory,
    pub quantity: i32,
    pub unit_price_snapshot: Decimal,
    pub subtotal: Decimal,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            id: item.id,
            service_id: item.service_id,
            item_type: item.item_type,
            category: item.category,
            quantity: item.quantity,
            unit_price_snapshot: item.unit_price_snapshot,
            subtotal: item.subtotal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::PickedUp,
            OrderStatus::Processing,
            OrderStatus::Ready,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::from_str(status.as_str()), Ok(status));
        }
    }

    #[test]
    fn test_invalid_status_rejected() {
        assert!(OrderStatus::from_str("folded").is_err());
    }

    #[test]
    fn test_status_serde_uses_snake_case() {
        let json = serde_json::to_string(&OrderStatus::OutForDelivery).unwrap();
        assert_eq!(json, r#""out_for_delivery""#);
    }

    #[test]
    fn test_payment_status_round_trip() {
        for status in [
            PaymentStatus::Unpaid,
            PaymentStatus::Paid,
            PaymentStatus::Refunded,
        ] {
            assert_eq!(PaymentStatus::from_str(status.as_str()), Ok(status));
        }
    }

    #[test]
    fn test_stored_breakdown_parses_back() {
        // The breakdown columns are JSONB; loading an order row requires
        // parsing what was serialized at creation
        let discounts: Vec<AppliedDiscount> = serde_json::from_str(
            r#"[{"discount_id":"ae1b3f64-6f54-4f6e-9a5e-0d8b2c7a1f00","name":"Weekday 10%","amount":"100"}]"#,
        )
        .unwrap();
        assert_eq!(discounts.len(), 1);
        assert_eq!(discounts[0].name, "Weekday 10%");
        assert_eq!(discounts[0].amount, rust_decimal_macros::dec!(100));

        let campaign: AppliedCampaign = serde_json::from_str(
            r#"{"campaign_id":"b2c4d6e8-1a2b-4c3d-8e9f-001122334455","name":"Monsoon","amount":"75"}"#,
        )
        .unwrap();
        assert_eq!(campaign.amount, rust_decimal_macros::dec!(75));
    }
}
