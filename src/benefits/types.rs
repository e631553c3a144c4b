// Domain types for the benefit system
// Discount rules, campaign promotions, and coupon kinds shared across
// the evaluator, repositories, and admin handlers

use crate::models::ServiceCategory;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Conditions gating a discount rule
///
/// All present conditions must hold for the rule to match. An empty
/// conditions block matches every order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleConditions {
    /// Minimum pre-discount order total (inclusive)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_order_total: Option<Decimal>,
    /// Minimum total item quantity across the order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u32>,
    /// Order must contain at least one item in one of these categories
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<ServiceCategory>>,
}

/// How a matching rule computes its discount amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiscountRuleKind {
    /// Percentage of the pre-discount order total, optionally capped
    Percentage {
        percent: Decimal,
        #[serde(skip_serializing_if = "Option::is_none")]
        max_discount: Option<Decimal>,
    },
    /// A fixed amount off the order
    Fixed { amount: Decimal },
    /// Percentage off, but only once the order total reaches a threshold
    Threshold {
        min_order_total: Decimal,
        percent: Decimal,
    },
}

/// A single rule inside an automatic discount
///
/// Rules are evaluated in sequence; the first whose conditions match the
/// order wins for that discount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountRule {
    #[serde(flatten)]
    pub kind: DiscountRuleKind,
    #[serde(default)]
    pub conditions: RuleConditions,
}

/// A campaign benefit descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Promotion {
    Flat { amount: Decimal },
    Percentage {
        percent: Decimal,
        #[serde(skip_serializing_if = "Option::is_none")]
        max_discount: Option<Decimal>,
    },
}

/// Event a campaign is active for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CampaignTrigger {
    OrderCheckout,
}

impl fmt::Display for CampaignTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CampaignTrigger::OrderCheckout => write!(f, "order_checkout"),
        }
    }
}

/// How a coupon's value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CouponKind {
    /// A discrete amount off (value is currency units)
    Flat,
    /// Percentage off the order total (value is 0-100)
    Percent,
}

impl fmt::Display for CouponKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CouponKind::Flat => write!(f, "flat"),
            CouponKind::Percent => write!(f, "percent"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rule_json_shape() {
        let rule = DiscountRule {
            kind: DiscountRuleKind::Percentage {
                percent: dec!(10),
                max_discount: Some(dec!(200)),
            },
            conditions: RuleConditions {
                min_order_total: Some(dec!(500)),
                ..Default::default()
            },
        };

        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["type"], "percentage");
        assert_eq!(json["conditions"]["min_order_total"], "500");

        let back: DiscountRule = serde_json::from_value(json).unwrap();
        assert_eq!(back, rule);
    }

    #[test]
    fn test_rule_without_conditions_defaults() {
        let rule: DiscountRule =
            serde_json::from_str(r#"{"type": "fixed", "amount": "50"}"#).unwrap();
        assert_eq!(rule.kind, DiscountRuleKind::Fixed { amount: dec!(50) });
        assert_eq!(rule.conditions, RuleConditions::default());
    }

    #[test]
    fn test_threshold_rule_round_trip() {
        let rule = DiscountRule {
            kind: DiscountRuleKind::Threshold {
                min_order_total: dec!(1000),
                percent: dec!(15),
            },
            conditions: RuleConditions::default(),
        };
        let json = serde_json::to_string(&rule).unwrap();
        let back: DiscountRule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rule);
    }

    #[test]
    fn test_promotion_variants() {
        let flat: Promotion = serde_json::from_str(r#"{"type": "flat", "amount": "100"}"#).unwrap();
        assert_eq!(flat, Promotion::Flat { amount: dec!(100) });

        let pct: Promotion =
            serde_json::from_str(r#"{"type": "percentage", "percent": "5"}"#).unwrap();
        assert_eq!(
            pct,
            Promotion::Percentage {
                percent: dec!(5),
                max_discount: None
            }
        );
    }

    #[test]
    fn test_unknown_rule_type_rejected() {
        let result: Result<DiscountRule, _> =
            serde_json::from_str(r#"{"type": "mystery", "amount": "50"}"#);
        assert!(result.is_err());
    }
}
