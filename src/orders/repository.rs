use rust_decimal::Decimal;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::benefits::{AppliedCampaign, AppliedDiscount};
use crate::models::{LaundryService, ServiceCategory, Tenancy};
use crate::orders::error::OrderError;
use crate::orders::{Order, OrderItem, OrderStatus, PaymentStatus};

const ORDER_COLUMNS: &str = "id, tenancy_id, customer_id, branch_id, status, payment_status, \
     subtotal, automatic_discount, applied_discounts, campaign_discount, applied_campaign, \
     coupon_code, coupon_discount, discount_total, tax, total_price, created_at, updated_at";

/// A fully priced order ready to persist, everything the evaluator and
/// calculator decided in one place
#[derive(Debug)]
pub struct NewOrder {
    pub tenancy_id: Uuid,
    pub customer_id: i32,
    pub branch_id: i32,
    pub subtotal: Decimal,
    pub automatic_discount: Decimal,
    pub applied_discounts: Vec<AppliedDiscount>,
    pub campaign_discount: Decimal,
    pub applied_campaign: Option<AppliedCampaign>,
    pub coupon_code: Option<String>,
    pub coupon_discount: Decimal,
    pub discount_total: Decimal,
    pub tax: Decimal,
    pub total_price: Decimal,
    /// (service_id, item_type, category, quantity, unit_price_snapshot, subtotal)
    pub items: Vec<(i32, String, ServiceCategory, i32, Decimal, Decimal)>,
}

/// Repository for laundry service lookups during order creation
#[derive(Clone)]
pub struct ServiceLookupRepository {
    pool: PgPool,
}

impl ServiceLookupRepository {
    /// Create a new ServiceLookupRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find multiple services by IDs within a tenancy
    pub async fn find_by_ids(
        &self,
        tenancy_id: Uuid,
        ids: &[i32],
    ) -> Result<Vec<LaundryService>, OrderError> {
        let services = sqlx::query_as::<_, LaundryService>(
            "SELECT id, tenancy_id, name, category, item_type, unit_price, turnaround_hours, \
                    is_active, created_at
             FROM services
             WHERE tenancy_id = $1 AND id = ANY($2)",
        )
        .bind(tenancy_id)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(services)
    }

    /// Check a branch exists within the tenancy
    pub async fn branch_exists(&self, tenancy_id: Uuid, branch_id: i32) -> Result<bool, OrderError> {
        let row: Option<(i32,)> =
            sqlx::query_as("SELECT id FROM branches WHERE tenancy_id = $1 AND id = $2")
                .bind(tenancy_id)
                .bind(branch_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.is_some())
    }

    /// Fetch the tenancy record (tax rate lives there)
    pub async fn find_tenancy(&self, tenancy_id: Uuid) -> Result<Tenancy, OrderError> {
        let tenancy = sqlx::query_as::<_, Tenancy>(
            "SELECT id, name, slug, tax_percent, is_active, created_at FROM tenancies WHERE id = $1",
        )
        .bind(tenancy_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(OrderError::NotFound)?;

        Ok(tenancy)
    }
}

/// Repository for order operations, always scoped by tenancy
#[derive(Clone)]
pub struct OrdersRepository {
    pool: PgPool,
}

impl OrdersRepository {
    /// Create a new OrdersRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an order with its items in a single transaction
    pub async fn create(&self, new_order: NewOrder) -> Result<Order, OrderError> {
        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO orders
                 (tenancy_id, customer_id, branch_id, status, payment_status, subtotal,
                  automatic_discount, applied_discounts, campaign_discount, applied_campaign,
                  coupon_code, coupon_discount, discount_total, tax, total_price)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(new_order.tenancy_id)
        .bind(new_order.customer_id)
        .bind(new_order.branch_id)
        .bind(OrderStatus::Pending)
        .bind(PaymentStatus::Unpaid)
        .bind(new_order.subtotal)
        .bind(new_order.automatic_discount)
        .bind(Json(&new_order.applied_discounts))
        .bind(new_order.campaign_discount)
        .bind(new_order.applied_campaign.as_ref().map(Json))
        .bind(&new_order.coupon_code)
        .bind(new_order.coupon_discount)
        .bind(new_order.discount_total)
        .bind(new_order.tax)
        .bind(new_order.total_price)
        .fetch_one(&mut *tx)
        .await?;

        for (service_id, item_type, category, quantity, unit_price, subtotal) in new_order.items {
            sqlx::query(
                "INSERT INTO order_items
                     (order_id, service_id, item_type, category, quantity,
                      unit_price_snapshot, subtotal)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(order.id)
            .bind(service_id)
            .bind(item_type)
            .bind(category)
            .bind(quantity)
            .bind(unit_price)
            .bind(subtotal)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(order)
    }

    /// Find an order by ID within a tenancy
    pub async fn find_by_id(
        &self,
        tenancy_id: Uuid,
        order_id: Uuid,
    ) -> Result<Option<Order>, OrderError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE tenancy_id = $1 AND id = $2"
        ))
        .bind(tenancy_id)
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Find orders for a customer with optional status filter
    pub async fn find_by_customer(
        &self,
        tenancy_id: Uuid,
        customer_id: i32,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, OrderError> {
        let orders = match status {
            Some(status_filter) => {
                sqlx::query_as::<_, Order>(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders
                     WHERE tenancy_id = $1 AND customer_id = $2 AND status = $3
                     ORDER BY created_at DESC"
                ))
                .bind(tenancy_id)
                .bind(customer_id)
                .bind(status_filter)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Order>(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders
                     WHERE tenancy_id = $1 AND customer_id = $2
                     ORDER BY created_at DESC"
                ))
                .bind(tenancy_id)
                .bind(customer_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(orders)
    }

    /// Find orders across the tenancy, optionally filtered by status (staff view)
    pub async fn find_by_tenancy(
        &self,
        tenancy_id: Uuid,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, OrderError> {
        let orders = match status {
            Some(status_filter) => {
                sqlx::query_as::<_, Order>(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders
                     WHERE tenancy_id = $1 AND status = $2
                     ORDER BY created_at DESC"
                ))
                .bind(tenancy_id)
                .bind(status_filter)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Order>(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders
                     WHERE tenancy_id = $1
                     ORDER BY created_at DESC"
                ))
                .bind(tenancy_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(orders)
    }

    /// Update order status
    pub async fn update_status(
        &self,
        tenancy_id: Uuid,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> Result<Order, OrderError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET status = $3, updated_at = NOW()
             WHERE tenancy_id = $1 AND id = $2
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(tenancy_id)
        .bind(order_id)
        .bind(new_status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(OrderError::NotFound)?;

        Ok(order)
    }

    /// Update payment status
    pub async fn update_payment_status(
        &self,
        tenancy_id: Uuid,
        order_id: Uuid,
        new_payment_status: PaymentStatus,
    ) -> Result<Order, OrderError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET payment_status = $3, updated_at = NOW()
             WHERE tenancy_id = $1 AND id = $2
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(tenancy_id)
        .bind(order_id)
        .bind(new_payment_status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(OrderError::NotFound)?;

        Ok(order)
    }
}

/// Repository for order items operations
#[derive(Clone)]
pub struct OrderItemsRepository {
    pool: PgPool,
}

impl OrderItemsRepository {
    /// Create a new OrderItemsRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find all items for a given order
    pub async fn find_by_order_id(&self, order_id: Uuid) -> Result<Vec<OrderItem>, OrderError> {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT id, order_id, service_id, item_type, category, quantity,
                    unit_price_snapshot, subtotal
             FROM order_items
             WHERE order_id = $1
             ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}
