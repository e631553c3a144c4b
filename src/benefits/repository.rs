use crate::benefits::{
    error::{BenefitError, BenefitResult},
    evaluator::CustomerProfile,
    models::{
        AutomaticDiscount, Campaign, Coupon, CreateCampaignRequest, CreateCouponRequest,
        CreateDiscountRequest, UpdateDiscountRequest,
    },
    types::CampaignTrigger,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

const DISCOUNT_COLUMNS: &str = "id, tenancy_id, name, priority, rules, \
     can_stack_with_other_discounts, can_stack_with_coupons, is_active, \
     starts_at, ends_at, usage_count, total_discount_given, created_at, updated_at";

const CAMPAIGN_COLUMNS: &str = "id, tenancy_id, name, trigger_event, promotions, \
     allow_stacking_with_discounts, allow_stacking_with_coupons, max_order_count, \
     min_order_total, min_signup_days, usage_limit, used_count, budget_cap, \
     spent_amount, unique_users, is_active, starts_at, ends_at, created_at, updated_at";

const COUPON_COLUMNS: &str = "id, tenancy_id, code, kind, value, max_discount, \
     min_order_value, first_order_only, usage_limit, used_count, is_active, \
     starts_at, ends_at, created_at";

/// Repository for benefit records, always scoped by tenancy
#[derive(Clone)]
pub struct BenefitRepository {
    pool: PgPool,
}

impl BenefitRepository {
    /// Create a new BenefitRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Active discounts for a tenancy, ordered the way the evaluator
    /// requires: descending priority, insertion order on ties
    pub async fn active_discounts(&self, tenancy_id: Uuid) -> BenefitResult<Vec<AutomaticDiscount>> {
        let discounts = sqlx::query_as::<_, AutomaticDiscount>(&format!(
            "SELECT {DISCOUNT_COLUMNS} FROM automatic_discounts
             WHERE tenancy_id = $1 AND is_active = TRUE
             ORDER BY priority DESC, created_at ASC"
        ))
        .bind(tenancy_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(discounts)
    }

    /// Active campaigns for the checkout trigger, in fetch order
    pub async fn active_checkout_campaigns(&self, tenancy_id: Uuid) -> BenefitResult<Vec<Campaign>> {
        let campaigns = sqlx::query_as::<_, Campaign>(&format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM campaigns
             WHERE tenancy_id = $1 AND trigger_event = $2 AND is_active = TRUE
             ORDER BY created_at ASC"
        ))
        .bind(tenancy_id)
        .bind(CampaignTrigger::OrderCheckout)
        .fetch_all(&self.pool)
        .await?;

        Ok(campaigns)
    }

    /// Look up a coupon by code within a tenancy
    ///
    /// Returns None for unknown codes; the caller decides whether an
    /// unknown code is an error or a silent drop.
    pub async fn find_coupon(&self, tenancy_id: Uuid, code: &str) -> BenefitResult<Option<Coupon>> {
        let coupon = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons
             WHERE tenancy_id = $1 AND code = $2"
        ))
        .bind(tenancy_id)
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(coupon)
    }

    /// Non-cancelled orders the customer has already placed in this tenancy
    pub async fn prior_order_count(&self, tenancy_id: Uuid, customer_id: i32) -> BenefitResult<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM orders
             WHERE tenancy_id = $1 AND customer_id = $2 AND status != 'cancelled'",
        )
        .bind(tenancy_id)
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Customer attributes the campaign eligibility checks need
    pub async fn customer_profile(
        &self,
        tenancy_id: Uuid,
        customer_id: i32,
    ) -> BenefitResult<CustomerProfile> {
        let row: (i64, Option<Decimal>, chrono::DateTime<Utc>) = sqlx::query_as(
            "SELECT
                 COUNT(o.id) FILTER (WHERE o.status != 'cancelled'),
                 COALESCE(SUM(o.total_price) FILTER (WHERE o.status != 'cancelled'), 0),
                 u.created_at
             FROM users u
             LEFT JOIN orders o ON o.customer_id = u.id AND o.tenancy_id = u.tenancy_id
             WHERE u.tenancy_id = $1 AND u.id = $2
             GROUP BY u.created_at",
        )
        .bind(tenancy_id)
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| BenefitError::NotFound {
            resource: "customer".to_string(),
            id: customer_id.to_string(),
        })?;

        Ok(CustomerProfile {
            customer_id,
            order_count: row.0,
            total_spent: row.1.unwrap_or(Decimal::ZERO),
            signup_date: row.2,
        })
    }

    // --- Admin CRUD: automatic discounts ---

    pub async fn create_discount(
        &self,
        tenancy_id: Uuid,
        request: CreateDiscountRequest,
    ) -> BenefitResult<AutomaticDiscount> {
        let discount = sqlx::query_as::<_, AutomaticDiscount>(&format!(
            "INSERT INTO automatic_discounts
                 (tenancy_id, name, priority, rules, can_stack_with_other_discounts,
                  can_stack_with_coupons, starts_at, ends_at)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, NOW()), $8)
             RETURNING {DISCOUNT_COLUMNS}"
        ))
        .bind(tenancy_id)
        .bind(&request.name)
        .bind(request.priority)
        .bind(Json(&request.rules))
        .bind(request.can_stack_with_other_discounts)
        .bind(request.can_stack_with_coupons)
        .bind(request.starts_at)
        .bind(request.ends_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(discount)
    }

    pub async fn list_discounts(&self, tenancy_id: Uuid) -> BenefitResult<Vec<AutomaticDiscount>> {
        let discounts = sqlx::query_as::<_, AutomaticDiscount>(&format!(
            "SELECT {DISCOUNT_COLUMNS} FROM automatic_discounts
             WHERE tenancy_id = $1
             ORDER BY priority DESC, created_at ASC"
        ))
        .bind(tenancy_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(discounts)
    }

    pub async fn find_discount(
        &self,
        tenancy_id: Uuid,
        id: Uuid,
    ) -> BenefitResult<Option<AutomaticDiscount>> {
        let discount = sqlx::query_as::<_, AutomaticDiscount>(&format!(
            "SELECT {DISCOUNT_COLUMNS} FROM automatic_discounts
             WHERE tenancy_id = $1 AND id = $2"
        ))
        .bind(tenancy_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(discount)
    }

    /// Partial update; unset fields keep their stored values
    pub async fn update_discount(
        &self,
        tenancy_id: Uuid,
        id: Uuid,
        request: UpdateDiscountRequest,
    ) -> BenefitResult<AutomaticDiscount> {
        let rules = request.rules.map(Json);
        let discount = sqlx::query_as::<_, AutomaticDiscount>(&format!(
            "UPDATE automatic_discounts SET
                 name = COALESCE($3, name),
                 priority = COALESCE($4, priority),
                 rules = COALESCE($5, rules),
                 can_stack_with_other_discounts = COALESCE($6, can_stack_with_other_discounts),
                 can_stack_with_coupons = COALESCE($7, can_stack_with_coupons),
                 is_active = COALESCE($8, is_active),
                 starts_at = COALESCE($9, starts_at),
                 ends_at = COALESCE($10, ends_at),
                 updated_at = NOW()
             WHERE tenancy_id = $1 AND id = $2
             RETURNING {DISCOUNT_COLUMNS}"
        ))
        .bind(tenancy_id)
        .bind(id)
        .bind(request.name)
        .bind(request.priority)
        .bind(rules)
        .bind(request.can_stack_with_other_discounts)
        .bind(request.can_stack_with_coupons)
        .bind(request.is_active)
        .bind(request.starts_at)
        .bind(request.ends_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| BenefitError::NotFound {
            resource: "discount".to_string(),
            id: id.to_string(),
        })?;

        Ok(discount)
    }

    pub async fn delete_discount(&self, tenancy_id: Uuid, id: Uuid) -> BenefitResult<()> {
        let result = sqlx::query("DELETE FROM automatic_discounts WHERE tenancy_id = $1 AND id = $2")
            .bind(tenancy_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(BenefitError::NotFound {
                resource: "discount".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    // --- Admin CRUD: campaigns ---

    pub async fn create_campaign(
        &self,
        tenancy_id: Uuid,
        request: CreateCampaignRequest,
    ) -> BenefitResult<Campaign> {
        let campaign = sqlx::query_as::<_, Campaign>(&format!(
            "INSERT INTO campaigns
                 (tenancy_id, name, trigger_event, promotions,
                  allow_stacking_with_discounts, allow_stacking_with_coupons,
                  max_order_count, min_order_total, min_signup_days,
                  usage_limit, budget_cap, starts_at, ends_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, COALESCE($12, NOW()), $13)
             RETURNING {CAMPAIGN_COLUMNS}"
        ))
        .bind(tenancy_id)
        .bind(&request.name)
        .bind(CampaignTrigger::OrderCheckout)
        .bind(Json(&request.promotions))
        .bind(request.allow_stacking_with_discounts)
        .bind(request.allow_stacking_with_coupons)
        .bind(request.max_order_count)
        .bind(request.min_order_total)
        .bind(request.min_signup_days)
        .bind(request.usage_limit)
        .bind(request.budget_cap)
        .bind(request.starts_at)
        .bind(request.ends_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(campaign)
    }

    pub async fn list_campaigns(&self, tenancy_id: Uuid) -> BenefitResult<Vec<Campaign>> {
        let campaigns = sqlx::query_as::<_, Campaign>(&format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM campaigns
             WHERE tenancy_id = $1
             ORDER BY created_at ASC"
        ))
        .bind(tenancy_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(campaigns)
    }

    pub async fn find_campaign(&self, tenancy_id: Uuid, id: Uuid) -> BenefitResult<Option<Campaign>> {
        let campaign = sqlx::query_as::<_, Campaign>(&format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM campaigns
             WHERE tenancy_id = $1 AND id = $2"
        ))
        .bind(tenancy_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(campaign)
    }

    pub async fn set_campaign_active(
        &self,
        tenancy_id: Uuid,
        id: Uuid,
        is_active: bool,
    ) -> BenefitResult<Campaign> {
        let campaign = sqlx::query_as::<_, Campaign>(&format!(
            "UPDATE campaigns SET is_active = $3, updated_at = NOW()
             WHERE tenancy_id = $1 AND id = $2
             RETURNING {CAMPAIGN_COLUMNS}"
        ))
        .bind(tenancy_id)
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| BenefitError::NotFound {
            resource: "campaign".to_string(),
            id: id.to_string(),
        })?;

        Ok(campaign)
    }

    pub async fn delete_campaign(&self, tenancy_id: Uuid, id: Uuid) -> BenefitResult<()> {
        let result = sqlx::query("DELETE FROM campaigns WHERE tenancy_id = $1 AND id = $2")
            .bind(tenancy_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(BenefitError::NotFound {
                resource: "campaign".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    // --- Admin CRUD: coupons ---

    pub async fn create_coupon(
        &self,
        tenancy_id: Uuid,
        request: CreateCouponRequest,
    ) -> BenefitResult<Coupon> {
        let coupon = sqlx::query_as::<_, Coupon>(&format!(
            "INSERT INTO coupons
                 (tenancy_id, code, kind, value, max_discount, min_order_value,
                  first_order_only, usage_limit, starts_at, ends_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, COALESCE($9, NOW()), $10)
             RETURNING {COUPON_COLUMNS}"
        ))
        .bind(tenancy_id)
        .bind(&request.code)
        .bind(request.kind)
        .bind(request.value)
        .bind(request.max_discount)
        .bind(request.min_order_value)
        .bind(request.first_order_only)
        .bind(request.usage_limit)
        .bind(request.starts_at)
        .bind(request.ends_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                BenefitError::DuplicateCouponCode(request.code.clone())
            }
            _ => BenefitError::DatabaseError(e),
        })?;

        Ok(coupon)
    }

    pub async fn list_coupons(&self, tenancy_id: Uuid) -> BenefitResult<Vec<Coupon>> {
        let coupons = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons
             WHERE tenancy_id = $1
             ORDER BY created_at DESC"
        ))
        .bind(tenancy_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(coupons)
    }

    pub async fn set_coupon_active(
        &self,
        tenancy_id: Uuid,
        id: Uuid,
        is_active: bool,
    ) -> BenefitResult<Coupon> {
        let coupon = sqlx::query_as::<_, Coupon>(&format!(
            "UPDATE coupons SET is_active = $3
             WHERE tenancy_id = $1 AND id = $2
             RETURNING {COUPON_COLUMNS}"
        ))
        .bind(tenancy_id)
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| BenefitError::NotFound {
            resource: "coupon".to_string(),
            id: id.to_string(),
        })?;

        Ok(coupon)
    }

    pub async fn delete_coupon(&self, tenancy_id: Uuid, id: Uuid) -> BenefitResult<()> {
        let result = sqlx::query("DELETE FROM coupons WHERE tenancy_id = $1 AND id = $2")
            .bind(tenancy_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(BenefitError::NotFound {
                resource: "coupon".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}
