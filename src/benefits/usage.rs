// Usage recording
//
// Applied benefits come back from the evaluator as a deferred list of
// actions. The recorder processes them strictly after the order write
// commits; each write is independent and best-effort, a failed counter
// update is logged and never rolls the order back.

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

/// A deferred usage write produced by the evaluator
#[derive(Debug, Clone, PartialEq)]
pub enum UsageAction {
    Discount {
        discount_id: Uuid,
        amount: Decimal,
    },
    Campaign {
        campaign_id: Uuid,
        customer_id: i32,
        amount: Decimal,
    },
    Coupon {
        coupon_id: Uuid,
        customer_id: i32,
        amount: Decimal,
    },
}

/// Processes the evaluator's usage outbox after the order commit
#[derive(Clone)]
pub struct UsageRecorder {
    pool: PgPool,
}

impl UsageRecorder {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply every action for an order, logging and swallowing failures
    pub async fn process(&self, order_id: Uuid, actions: &[UsageAction]) {
        for action in actions {
            match action {
                UsageAction::Discount {
                    discount_id,
                    amount,
                } => self.record_discount_usage(*discount_id, *amount).await,
                UsageAction::Campaign {
                    campaign_id,
                    customer_id,
                    amount,
                } => {
                    self.record_campaign_redemption(*campaign_id, *customer_id, order_id, *amount)
                        .await
                }
                UsageAction::Coupon {
                    coupon_id,
                    customer_id,
                    amount,
                } => {
                    self.record_coupon_usage(*coupon_id, *customer_id, order_id, *amount)
                        .await
                }
            }
        }
    }

    async fn record_discount_usage(&self, discount_id: Uuid, amount: Decimal) {
        let result = sqlx::query(
            "UPDATE automatic_discounts
             SET usage_count = usage_count + 1,
                 total_discount_given = total_discount_given + $2,
                 updated_at = NOW()
             WHERE id = $1",
        )
        .bind(discount_id)
        .bind(amount)
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            warn!("Failed to record discount usage for {}: {}", discount_id, e);
        }
    }

    /// Appends a redemption row, bumps the campaign counters, and recomputes
    /// the distinct-user analytics figure from the redemption log
    async fn record_campaign_redemption(
        &self,
        campaign_id: Uuid,
        customer_id: i32,
        order_id: Uuid,
        amount: Decimal,
    ) {
        let insert = sqlx::query(
            "INSERT INTO campaign_redemptions (campaign_id, customer_id, order_id, amount)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(campaign_id)
        .bind(customer_id)
        .bind(order_id)
        .bind(amount)
        .execute(&self.pool)
        .await;

        if let Err(e) = insert {
            warn!(
                "Failed to record campaign redemption for {}: {}",
                campaign_id, e
            );
            return;
        }

        let counters = sqlx::query(
            "UPDATE campaigns
             SET used_count = used_count + 1,
                 spent_amount = spent_amount + $2,
                 unique_users = (
                     SELECT COUNT(DISTINCT customer_id)
                     FROM campaign_redemptions
                     WHERE campaign_id = $1
                 ),
                 updated_at = NOW()
             WHERE id = $1",
        )
        .bind(campaign_id)
        .bind(amount)
        .execute(&self.pool)
        .await;

        if let Err(e) = counters {
            warn!(
                "Failed to update campaign counters for {}: {}",
                campaign_id, e
            );
        }
    }

    async fn record_coupon_usage(
        &self,
        coupon_id: Uuid,
        customer_id: i32,
        order_id: Uuid,
        amount: Decimal,
    ) {
        let insert = sqlx::query(
            "INSERT INTO coupon_usages (coupon_id, customer_id, order_id, amount)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(coupon_id)
        .bind(customer_id)
        .bind(order_id)
        .bind(amount)
        .execute(&self.pool)
        .await;

        if let Err(e) = insert {
            warn!("Failed to record coupon usage for {}: {}", coupon_id, e);
            return;
        }

        let counter = sqlx::query(
            "UPDATE coupons SET used_count = used_count + 1 WHERE id = $1",
        )
        .bind(coupon_id)
        .execute(&self.pool)
        .await;

        if let Err(e) = counter {
            warn!("Failed to update coupon counter for {}: {}", coupon_id, e);
        }
    }
}
