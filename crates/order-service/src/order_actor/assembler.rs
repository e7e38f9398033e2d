//! # Order Assembly
//!
//! Turns a cart into a priced order. Runs inside the Order actor's
//! `on_create`, so nothing is stored unless every step succeeds:
//!
//! 1. the customer exists;
//! 2. the restaurant is approved and active;
//! 3. every product exists, belongs to that restaurant and is available
//!    (and, with [`StockPolicy::OnAccept`], has enough stock); name and price
//!    are snapshotted onto the line;
//! 4. the subtotal is computed from the snapshots;
//! 5. the coupon is redeemed, which counts the use atomically in the coupon
//!    actor;
//! 6. delivery and total are computed and checked.
//!
//! A failure after step 5 gives the coupon use back. Amounts that overflow
//! are rejected as invalid instead of panicking the actor.
//!
//! Geocoding happens in [`OrderClient::place_order`](crate::clients::OrderClient::place_order)
//! before the request reaches the actor, so a rate-limited lookup never
//! holds up other orders.

use super::context::OrderContext;
use super::error::OrderError;
use crate::config::StockPolicy;
use crate::model::{
    CouponCode, Order, OrderCreate, OrderId, OrderItem, OrderStatus,
    PaymentStatus, ProductId, RestaurantId, RestaurantStatus, UserId, MAX_QUANTITY,
};
use crate::product_actor::ProductError;
use crate::restaurant_actor::RestaurantError;
use crate::user_actor::UserError;
use actor_framework::ActorClient;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

/// Builds the unpriced order from a cart. Only checks what needs no lookups.
pub(crate) fn draft(id: OrderId, params: OrderCreate) -> Result<Order, OrderError> {
    if params.items.is_empty() {
        return Err(OrderError::EmptyCart);
    }
    if let Some(line) = params
        .items
        .iter()
        .find(|line| line.quantity == 0 || line.quantity > MAX_QUANTITY)
    {
        return Err(OrderError::InvalidQuantity {
            product_id: line.product_id,
            quantity: i64::from(line.quantity),
        });
    }

    let items = params
        .items
        .iter()
        .map(|line| OrderItem {
            product_id: line.product_id,
            name: String::new(),
            quantity: line.quantity,
            unit_price: Decimal::ZERO,
        })
        .collect();

    Ok(Order {
        id,
        user_id: params.user_id,
        restaurant_id: params.restaurant_id,
        items,
        subtotal: Decimal::ZERO,
        discount_amount: Decimal::ZERO,
        coupon_code: params.coupon_code.filter(|code| !code.is_empty()),
        delivery_charge: Decimal::ZERO,
        total: Decimal::ZERO,
        delivery_address: params.delivery_address,
        restaurant_status: RestaurantStatus::Pending,
        rejection_reason: None,
        preparation_time_minutes: None,
        status: OrderStatus::Draft,
        payment_method: params.payment_method,
        payment_status: PaymentStatus::Pending,
        transaction_id: None,
        cancellation: None,
        stock_reserved: false,
        revision: 0,
        // Set once assembly succeeds.
        created_at: DateTime::<Utc>::UNIX_EPOCH,
        updated_at: DateTime::<Utc>::UNIX_EPOCH,
    })
}

/// Prices and validates a draft order. See the module docs for the steps.
pub(crate) async fn assemble(order: &mut Order, ctx: &OrderContext) -> Result<(), OrderError> {
    check_customer(order.user_id, ctx).await?;
    check_restaurant(order.restaurant_id, ctx).await?;

    let restaurant_id = order.restaurant_id;
    for item in order.items.iter_mut() {
        snapshot_item(item, restaurant_id, ctx).await?;
    }
    order.subtotal = order.items_subtotal().ok_or_else(|| out_of_range(order.id))?;

    let now = ctx.clock.now();
    if let Some(code) = order.coupon_code.clone() {
        order.discount_amount = ctx.coupons.redeem(code, order.subtotal, now).await?;
    }

    if let Err(e) = finish(order, ctx, now) {
        if let Some(code) = order.coupon_code.clone() {
            release_coupon(ctx, code).await;
        }
        return Err(e);
    }
    Ok(())
}

async fn check_customer(user_id: UserId, ctx: &OrderContext) -> Result<(), OrderError> {
    match ctx.users.get(user_id).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) | Err(UserError::NotFound(_)) => Err(OrderError::UserNotFound(user_id)),
        Err(e) => Err(OrderError::dependency(e)),
    }
}

async fn check_restaurant(restaurant_id: RestaurantId, ctx: &OrderContext) -> Result<(), OrderError> {
    match ctx.restaurants.get(restaurant_id).await {
        Ok(Some(restaurant)) if restaurant.accepts_orders() => Ok(()),
        Ok(_) | Err(RestaurantError::NotFound(_)) => {
            Err(OrderError::RestaurantUnavailable(restaurant_id))
        }
        Err(e) => Err(OrderError::dependency(e)),
    }
}

/// Copies the current catalog name and price onto the line.
async fn snapshot_item(
    item: &mut OrderItem,
    restaurant_id: RestaurantId,
    ctx: &OrderContext,
) -> Result<(), OrderError> {
    let product_id: ProductId = item.product_id;
    let product = match ctx.products.get(product_id).await {
        Ok(Some(product)) => product,
        Ok(None) | Err(ProductError::NotFound(_)) => {
            return Err(OrderError::ProductNotFound(product_id))
        }
        Err(e) => return Err(OrderError::dependency(e)),
    };

    if product.restaurant_id != restaurant_id {
        return Err(OrderError::CrossRestaurantCart {
            product_id,
            restaurant_id,
        });
    }
    if !product.is_available {
        return Err(OrderError::ProductUnavailable(product_id));
    }
    if ctx.config.stock_policy == StockPolicy::OnAccept && product.stock < item.quantity {
        return Err(OrderError::InsufficientStock {
            product_id,
            requested: item.quantity,
            available: product.stock,
        });
    }

    item.name = product.name;
    item.unit_price = product.price;
    debug!(%product_id, unit_price = %item.unit_price, quantity = item.quantity, "Line priced");
    Ok(())
}

fn finish(order: &mut Order, ctx: &OrderContext, now: DateTime<Utc>) -> Result<(), OrderError> {
    order.delivery_charge = ctx.config.delivery.charge_for(order.subtotal);
    order.total = order.expected_total().ok_or_else(|| out_of_range(order.id))?;
    if !order.totals_consistent() {
        error!(
            order_id = %order.id,
            subtotal = %order.subtotal,
            discount = %order.discount_amount,
            total = %order.total,
            "Order totals do not add up"
        );
        return Err(OrderError::internal(format!(
            "inconsistent totals for {}: subtotal {}, discount {}, total {}",
            order.id, order.subtotal, order.discount_amount, order.total
        )));
    }

    order.status = OrderStatus::Pending;
    order.created_at = now;
    order.updated_at = now;
    info!(
        order_id = %order.id,
        user_id = %order.user_id,
        restaurant_id = %order.restaurant_id,
        subtotal = %order.subtotal,
        discount = %order.discount_amount,
        delivery = %order.delivery_charge,
        total = %order.total,
        "Order assembled"
    );
    Ok(())
}

fn out_of_range(order_id: OrderId) -> OrderError {
    warn!(%order_id, "Order amount overflows");
    OrderError::Validation("order amount is out of range".into())
}

async fn release_coupon(ctx: &OrderContext, code: CouponCode) {
    match ctx.coupons.release(code.clone()).await {
        Ok(used_count) => info!(%code, used_count, "Coupon use given back"),
        Err(e) => error!(%code, error = %e, "Failed to give coupon use back"),
    }
}
