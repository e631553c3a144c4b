use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

use crate::auth::models::Role;
use crate::benefits::{
    BenefitEvaluator, BenefitRepository, CouponCandidate, EvaluationContext, EvaluationItem,
    UsageRecorder,
};
use crate::models::ServiceCategory;
use crate::notifications::Notifier;
use crate::orders::{
    CreateOrderRequest, NewOrder, Order, OrderError, OrderItemsRepository, OrderResponse,
    OrderStatus, OrdersRepository, PaymentStatus, PriceCalculator, ServiceLookupRepository,
    StatusMachine,
};

/// Service for order business logic
#[derive(Clone)]
pub struct OrderService {
    orders_repo: OrdersRepository,
    order_items_repo: OrderItemsRepository,
    service_lookup_repo: ServiceLookupRepository,
    benefit_repo: BenefitRepository,
    usage_recorder: UsageRecorder,
    notifier: Notifier,
}

impl OrderService {
    /// Create a new OrderService
    pub fn new(
        orders_repo: OrdersRepository,
        order_items_repo: OrderItemsRepository,
        service_lookup_repo: ServiceLookupRepository,
        benefit_repo: BenefitRepository,
        usage_recorder: UsageRecorder,
        notifier: Notifier,
    ) -> Self {
        Self {
            orders_repo,
            order_items_repo,
            service_lookup_repo,
            benefit_repo,
            usage_recorder,
            notifier,
        }
    }

    /// Create a new order
    ///
    /// Runs the full checkout pipeline:
    /// 1. Validate the request (items, quantities, coupon code shape)
    /// 2. Snapshot current service prices and compute the pre-discount total
    /// 3. Load benefit inputs and run the evaluator
    /// 4. Assemble final totals (clamp, tax, single rounding)
    /// 5. Persist order + items in one transaction
    /// 6. Process the usage outbox and fire the notification, both
    ///    best-effort after the commit
    pub async fn create_order(
        &self,
        tenancy_id: Uuid,
        customer_id: i32,
        request: CreateOrderRequest,
    ) -> Result<Order, OrderError> {
        if request.items.is_empty() {
            return Err(OrderError::ValidationError(
                "Order must contain at least one item".to_string(),
            ));
        }

        // A coupon field that is present but blank is a request error, not
        // a silent drop
        let coupon_code = match request.coupon_code.as_deref() {
            Some(code) if code.trim().is_empty() => return Err(OrderError::BlankCouponCode),
            Some(code) => Some(code.trim().to_uppercase()),
            None => None,
        };

        if !self
            .service_lookup_repo
            .branch_exists(tenancy_id, request.branch_id)
            .await?
        {
            return Err(OrderError::BranchNotFound(request.branch_id));
        }

        let service_ids: Vec<i32> = request
            .items
            .iter()
            .map(|item| {
                if item.quantity <= 0 {
                    return Err(OrderError::InvalidQuantity(format!(
                        "Quantity must be positive, got {}",
                        item.quantity
                    )));
                }
                Ok(item.service_id)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let services = self
            .service_lookup_repo
            .find_by_ids(tenancy_id, &service_ids)
            .await?;

        let service_map: HashMap<i32, (String, ServiceCategory, Decimal)> = services
            .into_iter()
            .filter(|service| service.is_active)
            .map(|service| {
                (
                    service.id,
                    (service.item_type, service.category, service.unit_price),
                )
            })
            .collect();

        // Price each line from the current catalog; snapshots are immutable
        // after this point
        let mut item_rows = Vec::new();
        let mut evaluation_items = Vec::new();
        let mut subtotals = Vec::new();

        for item_request in &request.items {
            let (item_type, category, unit_price) = service_map
                .get(&item_request.service_id)
                .ok_or(OrderError::ServiceNotFound(item_request.service_id))?;

            let subtotal = PriceCalculator::calculate_subtotal(item_request.quantity, *unit_price);
            subtotals.push(subtotal);

            item_rows.push((
                item_request.service_id,
                item_type.clone(),
                *category,
                item_request.quantity,
                *unit_price,
                subtotal,
            ));
            evaluation_items.push(EvaluationItem {
                service_id: item_request.service_id,
                category: *category,
                quantity: item_request.quantity as u32,
                unit_price: *unit_price,
            });
        }

        let subtotal = PriceCalculator::calculate_total(&subtotals);

        // Load the evaluator's inputs
        let tenancy = self.service_lookup_repo.find_tenancy(tenancy_id).await?;
        let discounts = self.benefit_repo.active_discounts(tenancy_id).await?;
        let campaigns = self
            .benefit_repo
            .active_checkout_campaigns(tenancy_id)
            .await?;
        let customer = self
            .benefit_repo
            .customer_profile(tenancy_id, customer_id)
            .await?;

        // An unknown coupon code is dropped silently; the candidate is only
        // built for codes that resolve to a record
        let coupon_candidate = match &coupon_code {
            Some(code) => match self.benefit_repo.find_coupon(tenancy_id, code).await? {
                Some(coupon) => {
                    let prior_order_count = self
                        .benefit_repo
                        .prior_order_count(tenancy_id, customer_id)
                        .await?;
                    Some(CouponCandidate {
                        coupon,
                        prior_order_count,
                    })
                }
                None => None,
            },
            None => None,
        };

        let ctx = EvaluationContext {
            tenancy_id,
            order_total: subtotal,
            items: evaluation_items,
            customer,
            now: chrono::Utc::now(),
        };

        let outcome =
            BenefitEvaluator::evaluate(&ctx, &discounts, &campaigns, coupon_candidate.as_ref())?;

        let totals = PriceCalculator::assemble_totals(
            subtotal,
            outcome.total_discount(),
            tenancy.tax_percent,
        );

        // Record the coupon code only when it actually applied
        let applied_coupon_code = outcome.applied_coupon.as_ref().map(|c| c.code.clone());

        let order = self
            .orders_repo
            .create(NewOrder {
                tenancy_id,
                customer_id,
                branch_id: request.branch_id,
                subtotal,
                automatic_discount: outcome.automatic_discount_total,
                applied_discounts: outcome.applied_discounts.clone(),
                campaign_discount: outcome.campaign_discount_total,
                applied_campaign: outcome.applied_campaign.clone(),
                coupon_code: applied_coupon_code,
                coupon_discount: outcome.coupon_discount_total,
                discount_total: totals.discount_total,
                tax: totals.tax,
                total_price: totals.total_price,
                items: item_rows,
            })
            .await?;

        // Strictly after the commit; failures here never fail the order
        self.usage_recorder
            .process(order.id, &outcome.usage_actions)
            .await;
        self.notifier.order_created(&order);

        Ok(order)
    }

    /// Get all orders for a customer with optional status filter
    pub async fn get_customer_orders(
        &self,
        tenancy_id: Uuid,
        customer_id: i32,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderResponse>, OrderError> {
        let orders = self
            .orders_repo
            .find_by_customer(tenancy_id, customer_id, status)
            .await?;

        let mut responses = Vec::new();
        for order in orders {
            let items = self.order_items_repo.find_by_order_id(order.id).await?;
            responses.push(OrderResponse::from_parts(order, items));
        }

        Ok(responses)
    }

    /// Get all orders in the tenancy, optionally filtered by status (staff view)
    pub async fn get_tenancy_orders(
        &self,
        tenancy_id: Uuid,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderResponse>, OrderError> {
        let orders = self.orders_repo.find_by_tenancy(tenancy_id, status).await?;

        let mut responses = Vec::new();
        for order in orders {
            let items = self.order_items_repo.find_by_order_id(order.id).await?;
            responses.push(OrderResponse::from_parts(order, items));
        }

        Ok(responses)
    }

    /// Get a specific order by ID
    ///
    /// Customers may only read their own orders; staff and admins may read
    /// any order in their tenancy.
    pub async fn get_order_by_id(
        &self,
        tenancy_id: Uuid,
        order_id: Uuid,
        requester_id: i32,
        requester_role: Role,
    ) -> Result<OrderResponse, OrderError> {
        let order = self
            .orders_repo
            .find_by_id(tenancy_id, order_id)
            .await?
            .ok_or(OrderError::NotFound)?;

        if requester_role == Role::Customer && order.customer_id != requester_id {
            return Err(OrderError::Forbidden(
                "You do not have permission to access this order".to_string(),
            ));
        }

        let items = self.order_items_repo.find_by_order_id(order.id).await?;
        Ok(OrderResponse::from_parts(order, items))
    }

    /// Update order status
    ///
    /// The transition must be valid according to the status machine. A
    /// notification fires on every actual change.
    pub async fn update_order_status(
        &self,
        tenancy_id: Uuid,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> Result<Order, OrderError> {
        let order = self
            .orders_repo
            .find_by_id(tenancy_id, order_id)
            .await?
            .ok_or(OrderError::NotFound)?;

        StatusMachine::transition(order.status, new_status)
            .map_err(OrderError::InvalidTransition)?;

        let updated_order = self
            .orders_repo
            .update_status(tenancy_id, order_id, new_status)
            .await?;

        if order.status != new_status {
            self.notifier
                .order_status_changed(&updated_order, order.status);
        }

        Ok(updated_order)
    }

    /// Update payment status
    ///
    /// Refunds are only permitted from the paid state.
    pub async fn update_payment_status(
        &self,
        tenancy_id: Uuid,
        order_id: Uuid,
        new_payment_status: PaymentStatus,
    ) -> Result<Order, OrderError> {
        let order = self
            .orders_repo
            .find_by_id(tenancy_id, order_id)
            .await?
            .ok_or(OrderError::NotFound)?;

        StatusMachine::payment_transition(order.payment_status, new_payment_status)
            .map_err(OrderError::InvalidPaymentTransition)?;

        let updated_order = self
            .orders_repo
            .update_payment_status(tenancy_id, order_id, new_payment_status)
            .await?;

        Ok(updated_order)
    }
}
