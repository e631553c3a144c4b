// Benefit Evaluator
//
// Single-pass stacking evaluation of automatic discounts, campaigns, and
// an optional coupon at order checkout. Pure and synchronous: repositories
// load the inputs, the evaluator is a function of them.

use crate::benefits::{
    error::{BenefitError, BenefitResult},
    models::{AutomaticDiscount, Campaign, Coupon},
    types::{CouponKind, DiscountRule, DiscountRuleKind, Promotion},
    usage::UsageAction,
};
use crate::models::ServiceCategory;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single line of the order as the evaluator sees it
#[derive(Debug, Clone)]
pub struct EvaluationItem {
    pub service_id: i32,
    pub category: ServiceCategory,
    pub quantity: u32,
    pub unit_price: Decimal,
}

/// Customer attributes campaigns gate on
#[derive(Debug, Clone)]
pub struct CustomerProfile {
    pub customer_id: i32,
    /// Non-cancelled orders placed in this tenancy before the current one
    pub order_count: i64,
    pub total_spent: Decimal,
    pub signup_date: DateTime<Utc>,
}

/// Everything the evaluator needs about the order being priced
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    pub tenancy_id: Uuid,
    /// Pre-discount order total; eligibility checks use this, never the
    /// running discounted total
    pub order_total: Decimal,
    pub items: Vec<EvaluationItem>,
    pub customer: CustomerProfile,
    pub now: DateTime<Utc>,
}

impl EvaluationContext {
    fn total_quantity(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    fn has_category(&self, categories: &[ServiceCategory]) -> bool {
        self.items
            .iter()
            .any(|item| categories.contains(&item.category))
    }
}

/// A coupon looked up by code, paired with what we know about the
/// customer's history for the first-order-only check
#[derive(Debug, Clone)]
pub struct CouponCandidate {
    pub coupon: Coupon,
    pub prior_order_count: i64,
}

/// An automatic discount that applied, with the amount its winning rule produced
///
/// Serialized into the order's embedded pricing breakdown and read back
/// when order rows are loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedDiscount {
    pub discount_id: Uuid,
    pub name: String,
    pub amount: Decimal,
}

/// The campaign that applied (at most one per order)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedCampaign {
    pub campaign_id: Uuid,
    pub name: String,
    pub amount: Decimal,
}

/// The coupon that survived every stacking check
#[derive(Debug, Clone, Serialize)]
pub struct AppliedCoupon {
    pub coupon_id: Uuid,
    pub code: String,
    pub amount: Decimal,
}

/// Result of a benefit evaluation
///
/// Amounts are unrounded; the price calculator rounds once at final
/// assembly. `usage_actions` is a deferred outbox processed strictly
/// after the order write succeeds.
#[derive(Debug, Clone)]
pub struct BenefitOutcome {
    pub automatic_discount_total: Decimal,
    pub applied_discounts: Vec<AppliedDiscount>,
    pub campaign_discount_total: Decimal,
    pub applied_campaign: Option<AppliedCampaign>,
    pub coupon_discount_total: Decimal,
    pub applied_coupon: Option<AppliedCoupon>,
    pub usage_actions: Vec<UsageAction>,
}

impl BenefitOutcome {
    pub fn total_discount(&self) -> Decimal {
        self.automatic_discount_total + self.campaign_discount_total + self.coupon_discount_total
    }
}

/// Benefit Evaluator
///
/// Stateless; exists as a struct so the evaluation entry point reads the
/// same way as the other engines.
pub struct BenefitEvaluator;

impl BenefitEvaluator {
    /// Evaluate benefits for an order
    ///
    /// Orchestrates the full stacking pass:
    /// 1. Automatic discounts in descending priority, first matching rule
    ///    per discount, a non-stacking discount ends the pass
    /// 2. At most one eligible campaign, in fetch order
    /// 3. The coupon, only if every applied benefit permits stacking with it
    ///
    /// `discounts` must arrive sorted by descending priority (ties broken
    /// by insertion order) and `campaigns` in fetch order; the repository
    /// queries guarantee both.
    pub fn evaluate(
        ctx: &EvaluationContext,
        discounts: &[AutomaticDiscount],
        campaigns: &[Campaign],
        coupon_candidate: Option<&CouponCandidate>,
    ) -> BenefitResult<BenefitOutcome> {
        let mut outcome = BenefitOutcome {
            automatic_discount_total: Decimal::ZERO,
            applied_discounts: Vec::new(),
            campaign_discount_total: Decimal::ZERO,
            applied_campaign: None,
            coupon_discount_total: Decimal::ZERO,
            applied_coupon: None,
            usage_actions: Vec::new(),
        };

        // Whether every applied benefit so far still permits a coupon
        let mut allow_coupon = true;

        Self::apply_discounts(ctx, discounts, &mut outcome, &mut allow_coupon);
        Self::apply_campaign(ctx, campaigns, &mut outcome, &mut allow_coupon);

        if let Some(candidate) = coupon_candidate {
            Self::apply_coupon(ctx, candidate, allow_coupon, &mut outcome)?;
        }

        Ok(outcome)
    }

    /// Pass 1: automatic discounts
    fn apply_discounts(
        ctx: &EvaluationContext,
        discounts: &[AutomaticDiscount],
        outcome: &mut BenefitOutcome,
        allow_coupon: &mut bool,
    ) {
        for discount in discounts {
            if !discount.is_live(ctx.now) {
                continue;
            }

            let Some(amount) = Self::winning_rule_amount(ctx, &discount.rules) else {
                continue;
            };
            if amount <= Decimal::ZERO {
                continue;
            }

            outcome.automatic_discount_total += amount;
            outcome.applied_discounts.push(AppliedDiscount {
                discount_id: discount.id,
                name: discount.name.clone(),
                amount,
            });
            outcome.usage_actions.push(UsageAction::Discount {
                discount_id: discount.id,
                amount,
            });
            *allow_coupon &= discount.can_stack_with_coupons;

            // A non-stacking discount ends the pass; there is no search
            // for the best combination
            if !discount.can_stack_with_other_discounts {
                break;
            }
        }
    }

    /// First rule whose conditions match wins for this discount
    fn winning_rule_amount(ctx: &EvaluationContext, rules: &[DiscountRule]) -> Option<Decimal> {
        rules
            .iter()
            .find(|rule| Self::rule_matches(ctx, rule))
            .map(|rule| Self::rule_amount(ctx, &rule.kind))
    }

    fn rule_matches(ctx: &EvaluationContext, rule: &DiscountRule) -> bool {
        let conditions = &rule.conditions;
        if let Some(min_total) = conditions.min_order_total {
            if ctx.order_total < min_total {
                return false;
            }
        }
        if let Some(min_items) = conditions.min_items {
            if ctx.total_quantity() < min_items {
                return false;
            }
        }
        if let Some(ref categories) = conditions.categories {
            if !ctx.has_category(categories) {
                return false;
            }
        }
        // Threshold rules carry their gate in the kind itself
        if let DiscountRuleKind::Threshold {
            min_order_total, ..
        } = rule.kind
        {
            if ctx.order_total < min_order_total {
                return false;
            }
        }
        true
    }

    fn rule_amount(ctx: &EvaluationContext, kind: &DiscountRuleKind) -> Decimal {
        match kind {
            DiscountRuleKind::Percentage {
                percent,
                max_discount,
            } => {
                let amount = ctx.order_total * percent / Decimal::from(100);
                match max_discount {
                    Some(cap) => amount.min(*cap),
                    None => amount,
                }
            }
            DiscountRuleKind::Fixed { amount } => (*amount).min(ctx.order_total),
            DiscountRuleKind::Threshold { percent, .. } => {
                ctx.order_total * *percent / Decimal::from(100)
            }
        }
    }

    /// Pass 2: at most one campaign, first eligible with a positive benefit
    fn apply_campaign(
        ctx: &EvaluationContext,
        campaigns: &[Campaign],
        outcome: &mut BenefitOutcome,
        allow_coupon: &mut bool,
    ) {
        for campaign in campaigns {
            if !campaign.is_live(ctx.now) || !campaign.has_capacity() {
                continue;
            }
            if !outcome.applied_discounts.is_empty() && !campaign.allow_stacking_with_discounts {
                continue;
            }
            if !Self::customer_eligible(ctx, campaign) {
                continue;
            }

            let amount = Self::campaign_benefit(ctx, &campaign.promotions);
            if amount <= Decimal::ZERO {
                continue;
            }

            outcome.campaign_discount_total = amount;
            outcome.applied_campaign = Some(AppliedCampaign {
                campaign_id: campaign.id,
                name: campaign.name.clone(),
                amount,
            });
            outcome.usage_actions.push(UsageAction::Campaign {
                campaign_id: campaign.id,
                customer_id: ctx.customer.customer_id,
                amount,
            });
            *allow_coupon &= campaign.allow_stacking_with_coupons;
            break;
        }
    }

    /// Eligibility is tested against the pre-discount total and the
    /// customer's history, never against the running discounted total
    fn customer_eligible(ctx: &EvaluationContext, campaign: &Campaign) -> bool {
        if let Some(max_orders) = campaign.max_order_count {
            if ctx.customer.order_count >= i64::from(max_orders) {
                return false;
            }
        }
        if let Some(min_total) = campaign.min_order_total {
            if ctx.order_total < min_total {
                return false;
            }
        }
        if let Some(min_days) = campaign.min_signup_days {
            let tenure_days = (ctx.now - ctx.customer.signup_date).num_days();
            if tenure_days < i64::from(min_days) {
                return false;
            }
        }
        true
    }

    fn campaign_benefit(ctx: &EvaluationContext, promotions: &[Promotion]) -> Decimal {
        promotions
            .iter()
            .map(|promotion| match promotion {
                Promotion::Flat { amount } => *amount,
                Promotion::Percentage {
                    percent,
                    max_discount,
                } => {
                    let amount = ctx.order_total * *percent / Decimal::from(100);
                    match max_discount {
                        Some(cap) => amount.min(*cap),
                        None => amount,
                    }
                }
            })
            .sum()
    }

    /// Pass 3: the coupon
    ///
    /// A found coupon below its minimum order value is a hard error; every
    /// other disqualification drops the coupon silently and the order
    /// proceeds without it.
    fn apply_coupon(
        ctx: &EvaluationContext,
        candidate: &CouponCandidate,
        allow_coupon: bool,
        outcome: &mut BenefitOutcome,
    ) -> BenefitResult<()> {
        let coupon = &candidate.coupon;

        // Tenancy isolation is enforced by the lookup query; if a
        // cross-tenancy record slips through, drop it here as well
        if coupon.tenancy_id != ctx.tenancy_id {
            return Ok(());
        }
        if !coupon.is_live(ctx.now) {
            return Ok(());
        }
        if let Some(limit) = coupon.usage_limit {
            if coupon.used_count >= limit {
                return Ok(());
            }
        }
        if coupon.first_order_only && candidate.prior_order_count > 0 {
            return Ok(());
        }
        if !allow_coupon {
            return Ok(());
        }

        if let Some(minimum) = coupon.min_order_value {
            if ctx.order_total < minimum {
                return Err(BenefitError::CouponMinimumNotMet {
                    code: coupon.code.clone(),
                    minimum,
                    order_total: ctx.order_total,
                });
            }
        }

        let amount = match coupon.kind {
            CouponKind::Flat => coupon.value.min(ctx.order_total),
            CouponKind::Percent => {
                let amount = ctx.order_total * coupon.value / Decimal::from(100);
                match coupon.max_discount {
                    Some(cap) => amount.min(cap),
                    None => amount,
                }
            }
        };
        if amount <= Decimal::ZERO {
            return Ok(());
        }

        outcome.coupon_discount_total = amount;
        outcome.applied_coupon = Some(AppliedCoupon {
            coupon_id: coupon.id,
            code: coupon.code.clone(),
            amount,
        });
        outcome.usage_actions.push(UsageAction::Coupon {
            coupon_id: coupon.id,
            customer_id: ctx.customer.customer_id,
            amount,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benefits::types::{CampaignTrigger, RuleConditions};
    use chrono::Duration;
    use rust_decimal_macros::dec;
    use sqlx::types::Json;

    fn context(order_total: Decimal) -> EvaluationContext {
        let now = Utc::now();
        EvaluationContext {
            tenancy_id: Uuid::new_v4(),
            order_total,
            items: vec![EvaluationItem {
                service_id: 1,
                category: ServiceCategory::Wash,
                quantity: 4,
                unit_price: order_total / dec!(4),
            }],
            customer: CustomerProfile {
                customer_id: 7,
                order_count: 5,
                total_spent: dec!(4000),
                signup_date: now - Duration::days(90),
            },
            now,
        }
    }

    fn discount(
        tenancy_id: Uuid,
        priority: i32,
        rules: Vec<DiscountRule>,
    ) -> AutomaticDiscount {
        let now = Utc::now();
        AutomaticDiscount {
            id: Uuid::new_v4(),
            tenancy_id,
            name: format!("discount-p{priority}"),
            priority,
            rules: Json(rules),
            can_stack_with_other_discounts: true,
            can_stack_with_coupons: true,
            is_active: true,
            starts_at: now - Duration::days(1),
            ends_at: None,
            usage_count: 0,
            total_discount_given: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    fn percent_rule(percent: Decimal) -> DiscountRule {
        DiscountRule {
            kind: DiscountRuleKind::Percentage {
                percent,
                max_discount: None,
            },
            conditions: RuleConditions::default(),
        }
    }

    fn campaign(tenancy_id: Uuid, promotions: Vec<Promotion>) -> Campaign {
        let now = Utc::now();
        Campaign {
            id: Uuid::new_v4(),
            tenancy_id,
            name: "campaign".to_string(),
            trigger_event: CampaignTrigger::OrderCheckout,
            promotions: Json(promotions),
            allow_stacking_with_discounts: true,
            allow_stacking_with_coupons: true,
            max_order_count: None,
            min_order_total: None,
            min_signup_days: None,
            usage_limit: None,
            used_count: 0,
            budget_cap: None,
            spent_amount: Decimal::ZERO,
            unique_users: 0,
            is_active: true,
            starts_at: now - Duration::days(1),
            ends_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn coupon(tenancy_id: Uuid, code: &str, kind: CouponKind, value: Decimal) -> Coupon {
        let now = Utc::now();
        Coupon {
            id: Uuid::new_v4(),
            tenancy_id,
            code: code.to_string(),
            kind,
            value,
            max_discount: None,
            min_order_value: None,
            first_order_only: false,
            usage_limit: None,
            used_count: 0,
            is_active: true,
            starts_at: now - Duration::days(1),
            ends_at: None,
            created_at: now,
        }
    }

    #[test]
    fn test_no_benefits_no_discount() {
        let ctx = context(dec!(1000));
        let outcome = BenefitEvaluator::evaluate(&ctx, &[], &[], None).unwrap();
        assert_eq!(outcome.total_discount(), Decimal::ZERO);
        assert!(outcome.usage_actions.is_empty());
    }

    #[test]
    fn test_single_percentage_discount() {
        let ctx = context(dec!(1000));
        let d = discount(ctx.tenancy_id, 10, vec![percent_rule(dec!(10))]);

        let outcome = BenefitEvaluator::evaluate(&ctx, &[d], &[], None).unwrap();
        assert_eq!(outcome.automatic_discount_total, dec!(100));
        assert_eq!(outcome.applied_discounts.len(), 1);
        assert_eq!(outcome.usage_actions.len(), 1);
    }

    #[test]
    fn test_percentage_cap_applies() {
        let ctx = context(dec!(2000));
        let d = discount(
            ctx.tenancy_id,
            10,
            vec![DiscountRule {
                kind: DiscountRuleKind::Percentage {
                    percent: dec!(20),
                    max_discount: Some(dec!(150)),
                },
                conditions: RuleConditions::default(),
            }],
        );

        let outcome = BenefitEvaluator::evaluate(&ctx, &[d], &[], None).unwrap();
        assert_eq!(outcome.automatic_discount_total, dec!(150));
    }

    #[test]
    fn test_first_matching_rule_wins_not_best() {
        // A 5% rule listed before a 20% rule wins even though it is worse
        let ctx = context(dec!(1000));
        let d = discount(
            ctx.tenancy_id,
            10,
            vec![percent_rule(dec!(5)), percent_rule(dec!(20))],
        );

        let outcome = BenefitEvaluator::evaluate(&ctx, &[d], &[], None).unwrap();
        assert_eq!(outcome.automatic_discount_total, dec!(50));
    }

    #[test]
    fn test_rule_conditions_gate_matching() {
        let ctx = context(dec!(400));
        let d = discount(
            ctx.tenancy_id,
            10,
            vec![
                DiscountRule {
                    kind: DiscountRuleKind::Percentage {
                        percent: dec!(15),
                        max_discount: None,
                    },
                    conditions: RuleConditions {
                        min_order_total: Some(dec!(500)),
                        ..Default::default()
                    },
                },
                percent_rule(dec!(5)),
            ],
        );

        // First rule's minimum is not met, second rule applies
        let outcome = BenefitEvaluator::evaluate(&ctx, &[d], &[], None).unwrap();
        assert_eq!(outcome.automatic_discount_total, dec!(20));
    }

    #[test]
    fn test_threshold_rule_gates_on_order_total() {
        let below = context(dec!(800));
        let above = context(dec!(1200));
        let rules = vec![DiscountRule {
            kind: DiscountRuleKind::Threshold {
                min_order_total: dec!(1000),
                percent: dec!(10),
            },
            conditions: RuleConditions::default(),
        }];

        let d = discount(below.tenancy_id, 10, rules.clone());
        let outcome = BenefitEvaluator::evaluate(&below, &[d], &[], None).unwrap();
        assert_eq!(outcome.automatic_discount_total, Decimal::ZERO);

        let d = discount(above.tenancy_id, 10, rules);
        let outcome = BenefitEvaluator::evaluate(&above, &[d], &[], None).unwrap();
        assert_eq!(outcome.automatic_discount_total, dec!(120));
    }

    #[test]
    fn test_category_condition() {
        let ctx = context(dec!(1000));
        let d = discount(
            ctx.tenancy_id,
            10,
            vec![DiscountRule {
                kind: DiscountRuleKind::Fixed { amount: dec!(100) },
                conditions: RuleConditions {
                    categories: Some(vec![ServiceCategory::DryClean]),
                    ..Default::default()
                },
            }],
        );

        // Order only contains wash items
        let outcome = BenefitEvaluator::evaluate(&ctx, &[d], &[], None).unwrap();
        assert_eq!(outcome.automatic_discount_total, Decimal::ZERO);
    }

    #[test]
    fn test_fixed_rule_clamped_to_order_total() {
        let ctx = context(dec!(60));
        let d = discount(
            ctx.tenancy_id,
            0,
            vec![DiscountRule {
                kind: DiscountRuleKind::Fixed { amount: dec!(100) },
                conditions: RuleConditions::default(),
            }],
        );

        let outcome = BenefitEvaluator::evaluate(&ctx, &[d], &[], None).unwrap();
        assert_eq!(outcome.automatic_discount_total, dec!(60));
    }

    #[test]
    fn test_non_stacking_discount_stops_pass() {
        let ctx = context(dec!(1000));
        let mut first = discount(ctx.tenancy_id, 20, vec![percent_rule(dec!(10))]);
        first.can_stack_with_other_discounts = false;
        let second = discount(ctx.tenancy_id, 10, vec![percent_rule(dec!(5))]);

        let outcome = BenefitEvaluator::evaluate(&ctx, &[first, second], &[], None).unwrap();
        assert_eq!(outcome.applied_discounts.len(), 1);
        assert_eq!(outcome.automatic_discount_total, dec!(100));
    }

    #[test]
    fn test_non_matching_discount_does_not_stop_pass() {
        // A non-stacking discount whose rules do not match must not block
        // lower-priority discounts
        let ctx = context(dec!(400));
        let mut first = discount(
            ctx.tenancy_id,
            20,
            vec![DiscountRule {
                kind: DiscountRuleKind::Percentage {
                    percent: dec!(25),
                    max_discount: None,
                },
                conditions: RuleConditions {
                    min_order_total: Some(dec!(500)),
                    ..Default::default()
                },
            }],
        );
        first.can_stack_with_other_discounts = false;
        let second = discount(ctx.tenancy_id, 10, vec![percent_rule(dec!(5))]);

        let outcome = BenefitEvaluator::evaluate(&ctx, &[first, second], &[], None).unwrap();
        assert_eq!(outcome.applied_discounts.len(), 1);
        assert_eq!(outcome.automatic_discount_total, dec!(20));
    }

    #[test]
    fn test_expired_discount_skipped() {
        let ctx = context(dec!(1000));
        let mut d = discount(ctx.tenancy_id, 10, vec![percent_rule(dec!(10))]);
        d.ends_at = Some(ctx.now - Duration::hours(1));

        let outcome = BenefitEvaluator::evaluate(&ctx, &[d], &[], None).unwrap();
        assert_eq!(outcome.automatic_discount_total, Decimal::ZERO);
    }

    #[test]
    fn test_first_eligible_campaign_wins() {
        let ctx = context(dec!(1000));
        let first = campaign(ctx.tenancy_id, vec![Promotion::Flat { amount: dec!(50) }]);
        let second = campaign(ctx.tenancy_id, vec![Promotion::Flat { amount: dec!(200) }]);

        let outcome = BenefitEvaluator::evaluate(&ctx, &[], &[first.clone(), second], None).unwrap();
        assert_eq!(outcome.campaign_discount_total, dec!(50));
        assert_eq!(
            outcome.applied_campaign.as_ref().unwrap().campaign_id,
            first.id
        );
    }

    #[test]
    fn test_campaign_eligibility_uses_pre_discount_total() {
        // 50% discount drops the running total below the campaign minimum,
        // but eligibility is checked against the pre-discount total
        let ctx = context(dec!(1000));
        let d = discount(ctx.tenancy_id, 10, vec![percent_rule(dec!(50))]);
        let mut c = campaign(ctx.tenancy_id, vec![Promotion::Flat { amount: dec!(100) }]);
        c.min_order_total = Some(dec!(800));

        let outcome = BenefitEvaluator::evaluate(&ctx, &[d], &[c], None).unwrap();
        assert!(outcome.applied_campaign.is_some());
    }

    #[test]
    fn test_campaign_max_order_count() {
        let mut ctx = context(dec!(1000));
        let mut c = campaign(ctx.tenancy_id, vec![Promotion::Flat { amount: dec!(100) }]);
        c.max_order_count = Some(3);

        ctx.customer.order_count = 5;
        let outcome = BenefitEvaluator::evaluate(&ctx, &[], &[c.clone()], None).unwrap();
        assert!(outcome.applied_campaign.is_none());

        ctx.customer.order_count = 2;
        let outcome = BenefitEvaluator::evaluate(&ctx, &[], &[c], None).unwrap();
        assert!(outcome.applied_campaign.is_some());
    }

    #[test]
    fn test_campaign_min_signup_days() {
        let mut ctx = context(dec!(1000));
        ctx.customer.signup_date = ctx.now - Duration::days(10);
        let mut c = campaign(ctx.tenancy_id, vec![Promotion::Flat { amount: dec!(100) }]);
        c.min_signup_days = Some(30);

        let outcome = BenefitEvaluator::evaluate(&ctx, &[], &[c], None).unwrap();
        assert!(outcome.applied_campaign.is_none());
    }

    #[test]
    fn test_campaign_skipped_when_stacking_with_discounts_refused() {
        let ctx = context(dec!(1000));
        let d = discount(ctx.tenancy_id, 10, vec![percent_rule(dec!(10))]);
        let mut c = campaign(ctx.tenancy_id, vec![Promotion::Flat { amount: dec!(100) }]);
        c.allow_stacking_with_discounts = false;

        let outcome = BenefitEvaluator::evaluate(&ctx, &[d.clone()], &[c.clone()], None).unwrap();
        assert!(outcome.applied_campaign.is_none());

        // Without any applied discount the same campaign applies
        let outcome = BenefitEvaluator::evaluate(&ctx, &[], &[c], None).unwrap();
        assert!(outcome.applied_campaign.is_some());
    }

    #[test]
    fn test_campaign_exhausted_usage_limit_skipped() {
        let ctx = context(dec!(1000));
        let mut c = campaign(ctx.tenancy_id, vec![Promotion::Flat { amount: dec!(100) }]);
        c.usage_limit = Some(5);
        c.used_count = 5;

        let outcome = BenefitEvaluator::evaluate(&ctx, &[], &[c], None).unwrap();
        assert!(outcome.applied_campaign.is_none());
    }

    #[test]
    fn test_campaign_promotions_sum() {
        let ctx = context(dec!(1000));
        let c = campaign(
            ctx.tenancy_id,
            vec![
                Promotion::Flat { amount: dec!(50) },
                Promotion::Percentage {
                    percent: dec!(5),
                    max_discount: Some(dec!(40)),
                },
            ],
        );

        let outcome = BenefitEvaluator::evaluate(&ctx, &[], &[c], None).unwrap();
        assert_eq!(outcome.campaign_discount_total, dec!(90));
    }

    #[test]
    fn test_flat_coupon_applies() {
        let ctx = context(dec!(1000));
        let candidate = CouponCandidate {
            coupon: coupon(ctx.tenancy_id, "SAVE100", CouponKind::Flat, dec!(100)),
            prior_order_count: 3,
        };

        let outcome = BenefitEvaluator::evaluate(&ctx, &[], &[], Some(&candidate)).unwrap();
        assert_eq!(outcome.coupon_discount_total, dec!(100));
        assert_eq!(outcome.applied_coupon.unwrap().code, "SAVE100");
    }

    #[test]
    fn test_percent_coupon_respects_cap() {
        let ctx = context(dec!(2000));
        let mut c = coupon(ctx.tenancy_id, "PCT20", CouponKind::Percent, dec!(20));
        c.max_discount = Some(dec!(250));
        let candidate = CouponCandidate {
            coupon: c,
            prior_order_count: 0,
        };

        let outcome = BenefitEvaluator::evaluate(&ctx, &[], &[], Some(&candidate)).unwrap();
        assert_eq!(outcome.coupon_discount_total, dec!(250));
    }

    #[test]
    fn test_coupon_below_minimum_is_hard_error() {
        let ctx = context(dec!(300));
        let mut c = coupon(ctx.tenancy_id, "BIG", CouponKind::Flat, dec!(100));
        c.min_order_value = Some(dec!(500));
        let candidate = CouponCandidate {
            coupon: c,
            prior_order_count: 0,
        };

        let err = BenefitEvaluator::evaluate(&ctx, &[], &[], Some(&candidate)).unwrap_err();
        assert!(matches!(err, BenefitError::CouponMinimumNotMet { .. }));
    }

    #[test]
    fn test_expired_coupon_dropped_silently() {
        let ctx = context(dec!(1000));
        let mut c = coupon(ctx.tenancy_id, "OLD", CouponKind::Flat, dec!(100));
        c.ends_at = Some(ctx.now - Duration::hours(1));
        let candidate = CouponCandidate {
            coupon: c,
            prior_order_count: 0,
        };

        let outcome = BenefitEvaluator::evaluate(&ctx, &[], &[], Some(&candidate)).unwrap();
        assert!(outcome.applied_coupon.is_none());
        assert_eq!(outcome.coupon_discount_total, Decimal::ZERO);
    }

    #[test]
    fn test_exhausted_coupon_dropped_silently() {
        let ctx = context(dec!(1000));
        let mut c = coupon(ctx.tenancy_id, "GONE", CouponKind::Flat, dec!(100));
        c.usage_limit = Some(10);
        c.used_count = 10;
        let candidate = CouponCandidate {
            coupon: c,
            prior_order_count: 0,
        };

        let outcome = BenefitEvaluator::evaluate(&ctx, &[], &[], Some(&candidate)).unwrap();
        assert!(outcome.applied_coupon.is_none());
    }

    #[test]
    fn test_first_order_only_coupon() {
        let ctx = context(dec!(1000));
        let mut c = coupon(ctx.tenancy_id, "WELCOME", CouponKind::Flat, dec!(100));
        c.first_order_only = true;

        let returning = CouponCandidate {
            coupon: c.clone(),
            prior_order_count: 2,
        };
        let outcome = BenefitEvaluator::evaluate(&ctx, &[], &[], Some(&returning)).unwrap();
        assert!(outcome.applied_coupon.is_none());

        let first_timer = CouponCandidate {
            coupon: c,
            prior_order_count: 0,
        };
        let outcome = BenefitEvaluator::evaluate(&ctx, &[], &[], Some(&first_timer)).unwrap();
        assert!(outcome.applied_coupon.is_some());
    }

    #[test]
    fn test_discount_refusing_coupons_drops_coupon() {
        let ctx = context(dec!(1000));
        let mut d = discount(ctx.tenancy_id, 10, vec![percent_rule(dec!(10))]);
        d.can_stack_with_coupons = false;
        let candidate = CouponCandidate {
            coupon: coupon(ctx.tenancy_id, "SAVE100", CouponKind::Flat, dec!(100)),
            prior_order_count: 0,
        };

        let outcome = BenefitEvaluator::evaluate(&ctx, &[d], &[], Some(&candidate)).unwrap();
        assert_eq!(outcome.automatic_discount_total, dec!(100));
        assert!(outcome.applied_coupon.is_none());
    }

    #[test]
    fn test_campaign_refusing_coupons_drops_coupon() {
        let ctx = context(dec!(1000));
        let mut c = campaign(ctx.tenancy_id, vec![Promotion::Flat { amount: dec!(50) }]);
        c.allow_stacking_with_coupons = false;
        let candidate = CouponCandidate {
            coupon: coupon(ctx.tenancy_id, "SAVE100", CouponKind::Flat, dec!(100)),
            prior_order_count: 0,
        };

        let outcome = BenefitEvaluator::evaluate(&ctx, &[], &[c], Some(&candidate)).unwrap();
        assert!(outcome.applied_campaign.is_some());
        assert!(outcome.applied_coupon.is_none());
    }

    #[test]
    fn test_cross_tenancy_coupon_dropped() {
        let ctx = context(dec!(1000));
        let candidate = CouponCandidate {
            coupon: coupon(Uuid::new_v4(), "OTHER", CouponKind::Flat, dec!(100)),
            prior_order_count: 0,
        };

        let outcome = BenefitEvaluator::evaluate(&ctx, &[], &[], Some(&candidate)).unwrap();
        assert!(outcome.applied_coupon.is_none());
    }

    #[test]
    fn test_full_stack_discount_campaign_coupon() {
        let ctx = context(dec!(1000));
        let d = discount(ctx.tenancy_id, 10, vec![percent_rule(dec!(10))]);
        let c = campaign(ctx.tenancy_id, vec![Promotion::Flat { amount: dec!(50) }]);
        let candidate = CouponCandidate {
            coupon: coupon(ctx.tenancy_id, "STACK", CouponKind::Flat, dec!(75)),
            prior_order_count: 1,
        };

        let outcome =
            BenefitEvaluator::evaluate(&ctx, &[d], &[c], Some(&candidate)).unwrap();
        assert_eq!(outcome.total_discount(), dec!(225));
        assert_eq!(outcome.usage_actions.len(), 3);
    }

    #[test]
    fn test_usage_actions_match_applied_benefits() {
        let ctx = context(dec!(1000));
        let d = discount(ctx.tenancy_id, 10, vec![percent_rule(dec!(10))]);

        let outcome = BenefitEvaluator::evaluate(&ctx, &[d.clone()], &[], None).unwrap();
        assert_eq!(outcome.usage_actions.len(), 1);
        match &outcome.usage_actions[0] {
            UsageAction::Discount {
                discount_id,
                amount,
            } => {
                assert_eq!(*discount_id, d.id);
                assert_eq!(*amount, dec!(100));
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::benefits::types::RuleConditions;
    use chrono::Duration;
    use proptest::prelude::*;
    use sqlx::types::Json;

    fn arb_total() -> impl Strategy<Value = Decimal> {
        (1u64..1_000_000).prop_map(|n| Decimal::from(n) / Decimal::from(100))
    }

    fn arb_percent() -> impl Strategy<Value = Decimal> {
        (0u64..=10_000).prop_map(|n| Decimal::from(n) / Decimal::from(100))
    }

    fn make_context(order_total: Decimal) -> EvaluationContext {
        let now = Utc::now();
        EvaluationContext {
            tenancy_id: Uuid::new_v4(),
            order_total,
            items: vec![EvaluationItem {
                service_id: 1,
                category: crate::models::ServiceCategory::Wash,
                quantity: 1,
                unit_price: order_total,
            }],
            customer: CustomerProfile {
                customer_id: 1,
                order_count: 0,
                total_spent: Decimal::ZERO,
                signup_date: now - Duration::days(30),
            },
            now,
        }
    }

    proptest! {
        /// A percentage discount never exceeds the order total for
        /// percentages up to 100
        #[test]
        fn prop_percentage_discount_bounded(total in arb_total(), percent in arb_percent()) {
            let percent = percent.min(Decimal::from(100));
            let ctx = make_context(total);
            let now = ctx.now;
            let d = AutomaticDiscount {
                id: Uuid::new_v4(),
                tenancy_id: ctx.tenancy_id,
                name: "prop".to_string(),
                priority: 0,
                rules: Json(vec![DiscountRule {
                    kind: DiscountRuleKind::Percentage { percent, max_discount: None },
                    conditions: RuleConditions::default(),
                }]),
                can_stack_with_other_discounts: true,
                can_stack_with_coupons: true,
                is_active: true,
                starts_at: now - Duration::days(1),
                ends_at: None,
                usage_count: 0,
                total_discount_given: Decimal::ZERO,
                created_at: now,
                updated_at: now,
            };

            let outcome = BenefitEvaluator::evaluate(&ctx, &[d], &[], None).unwrap();
            prop_assert!(outcome.automatic_discount_total <= total);
            prop_assert!(outcome.automatic_discount_total >= Decimal::ZERO);
        }

        /// Fixed discounts are clamped so the discount never exceeds the total
        #[test]
        fn prop_fixed_discount_clamped(total in arb_total(), amount in arb_total()) {
            let ctx = make_context(total);
            let now = ctx.now;
            let d = AutomaticDiscount {
                id: Uuid::new_v4(),
                tenancy_id: ctx.tenancy_id,
                name: "prop".to_string(),
                priority: 0,
                rules: Json(vec![DiscountRule {
                    kind: DiscountRuleKind::Fixed { amount },
                    conditions: RuleConditions::default(),
                }]),
                can_stack_with_other_discounts: true,
                can_stack_with_coupons: true,
                is_active: true,
                starts_at: now - Duration::days(1),
                ends_at: None,
                usage_count: 0,
                total_discount_given: Decimal::ZERO,
                created_at: now,
                updated_at: now,
            };

            let outcome = BenefitEvaluator::evaluate(&ctx, &[d], &[], None).unwrap();
            prop_assert!(outcome.automatic_discount_total <= total);
        }

        /// Every applied benefit emits exactly one usage action
        #[test]
        fn prop_usage_actions_count(total in arb_total()) {
            let ctx = make_context(total);
            let outcome = BenefitEvaluator::evaluate(&ctx, &[], &[], None).unwrap();
            let applied = outcome.applied_discounts.len()
                + outcome.applied_campaign.iter().count()
                + outcome.applied_coupon.iter().count();
            prop_assert_eq!(outcome.usage_actions.len(), applied);
        }
    }
}
