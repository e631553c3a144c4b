// Benefit records: automatic discounts, campaigns, coupons
// JSONB payloads (rules, promotions) are decoded through sqlx::types::Json

use crate::benefits::types::{CampaignTrigger, CouponKind, DiscountRule, Promotion};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;
use validator::Validate;

/// A tenancy-configured automatic discount
///
/// Rules are evaluated in order; usage tallies are best-effort counters
/// updated after the order write.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AutomaticDiscount {
    pub id: Uuid,
    pub tenancy_id: Uuid,
    pub name: String,
    pub priority: i32,
    pub rules: Json<Vec<DiscountRule>>,
    pub can_stack_with_other_discounts: bool,
    pub can_stack_with_coupons: bool,
    pub is_active: bool,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub usage_count: i32,
    pub total_discount_given: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AutomaticDiscount {
    /// Whether the discount may apply at this instant
    /// Re-checked at evaluation time, not cached from listing
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.starts_at <= now
            && self.ends_at.map_or(true, |ends| now <= ends)
    }
}

/// A promotional campaign gated by customer eligibility
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Campaign {
    pub id: Uuid,
    pub tenancy_id: Uuid,
    pub name: String,
    pub trigger_event: CampaignTrigger,
    pub promotions: Json<Vec<Promotion>>,
    pub allow_stacking_with_discounts: bool,
    pub allow_stacking_with_coupons: bool,
    pub max_order_count: Option<i32>,
    pub min_order_total: Option<Decimal>,
    pub min_signup_days: Option<i32>,
    pub usage_limit: Option<i32>,
    pub used_count: i32,
    pub budget_cap: Option<Decimal>,
    pub spent_amount: Decimal,
    pub unique_users: i32,
    pub is_active: bool,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.starts_at <= now
            && self.ends_at.map_or(true, |ends| now <= ends)
    }

    /// Usage and budget caps are best-effort limits, checked at evaluation
    pub fn has_capacity(&self) -> bool {
        if let Some(limit) = self.usage_limit {
            if self.used_count >= limit {
                return false;
            }
        }
        if let Some(cap) = self.budget_cap {
            if self.spent_amount >= cap {
                return false;
            }
        }
        true
    }
}

/// A customer-redeemable coupon code, unique per tenancy
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Coupon {
    pub id: Uuid,
    pub tenancy_id: Uuid,
    pub code: String,
    pub kind: CouponKind,
    pub value: Decimal,
    pub max_discount: Option<Decimal>,
    pub min_order_value: Option<Decimal>,
    pub first_order_only: bool,
    pub usage_limit: Option<i32>,
    pub used_count: i32,
    pub is_active: bool,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Coupon {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.starts_at <= now
            && self.ends_at.map_or(true, |ends| now <= ends)
    }
}

/// Request DTO for creating an automatic discount
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDiscountRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub priority: i32,
    #[validate(length(min = 1, message = "At least one rule is required"))]
    pub rules: Vec<DiscountRule>,
    #[serde(default = "default_true")]
    pub can_stack_with_other_discounts: bool,
    #[serde(default = "default_true")]
    pub can_stack_with_coupons: bool,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

/// Request DTO for updating an automatic discount
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDiscountRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    pub priority: Option<i32>,
    pub rules: Option<Vec<DiscountRule>>,
    pub can_stack_with_other_discounts: Option<bool>,
    pub can_stack_with_coupons: Option<bool>,
    pub is_active: Option<bool>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

/// Request DTO for creating a campaign
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCampaignRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(min = 1, message = "At least one promotion is required"))]
    pub promotions: Vec<Promotion>,
    #[serde(default = "default_true")]
    pub allow_stacking_with_discounts: bool,
    #[serde(default = "default_true")]
    pub allow_stacking_with_coupons: bool,
    pub max_order_count: Option<i32>,
    pub min_order_total: Option<Decimal>,
    pub min_signup_days: Option<i32>,
    pub usage_limit: Option<i32>,
    pub budget_cap: Option<Decimal>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

/// Request DTO for creating a coupon
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCouponRequest {
    #[validate(custom = "crate::validation::validate_coupon_code")]
    pub code: String,
    pub kind: CouponKind,
    #[validate(custom = "crate::validation::validate_positive_price")]
    pub value: Decimal,
    pub max_discount: Option<Decimal>,
    pub min_order_value: Option<Decimal>,
    #[serde(default)]
    pub first_order_only: bool,
    pub usage_limit: Option<i32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}
