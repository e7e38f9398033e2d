//! # Receipts
//!
//! A receipt is a read-only projection of a stored order: the line items as
//! they were priced at placement, the money breakdown, delivery and payment.
//! Nothing is looked up from the catalog, so a receipt never changes when
//! prices do.
//!
//! [`ReceiptView`] serializes to camelCase JSON and renders as a text table
//! through `Display`.

use crate::clients::{OrderClient, UserClient};
use crate::model::money::checked_sum;
use crate::model::{
    CouponCode, Coordinates, Order, OrderId, OrderItem, OrderStatus, PaymentMethod, PaymentStatus,
    RestaurantStatus, User,
};
use crate::order_actor::OrderError;
use actor_framework::ActorClient;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::{self, Display};
use tabled::builder::Builder;
use tabled::settings::object::{Columns, Rows};
use tabled::settings::{Alignment, Style};
use tracing::{error, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptLine {
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

impl ReceiptLine {
    /// `None` when the line amount overflows.
    fn from_item(item: &OrderItem) -> Option<Self> {
        Some(Self {
            name: item.name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_total: item.line_total()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptView {
    pub order_id: OrderId,
    pub placed_at: DateTime<Utc>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub lines: Vec<ReceiptLine>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub coupon_code: Option<CouponCode>,
    pub delivery_charge: Decimal,
    pub total: Decimal,
    pub delivery_address: String,
    pub coordinates: Option<Coordinates>,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub status: OrderStatus,
    pub restaurant_status: RestaurantStatus,
    pub rejection_reason: Option<String>,
    pub currency: String,
}

impl ReceiptView {
    /// Projects `order` into a receipt.
    ///
    /// The totals are recomputed from the item snapshots. A stored order that
    /// disagrees with its own items is reported as an internal error rather
    /// than printed.
    pub fn project(order: &Order, customer: Option<&User>, currency: &str) -> Result<Self, OrderError> {
        let recomputed = order
            .items
            .iter()
            .map(ReceiptLine::from_item)
            .collect::<Option<Vec<_>>>()
            .and_then(|lines| {
                let subtotal = checked_sum(lines.iter().map(|line| line.line_total))?;
                let total = subtotal
                    .checked_sub(order.discount_amount)?
                    .checked_add(order.delivery_charge)?;
                Some((lines, subtotal, total))
            });
        let Some((lines, subtotal, total)) = recomputed else {
            error!(order_id = %order.id, "Stored order amounts overflow");
            return Err(OrderError::internal(format!("receipt totals for {} overflow", order.id)));
        };

        if subtotal != order.subtotal || total != order.total {
            error!(
                order_id = %order.id,
                stored_subtotal = %order.subtotal,
                computed_subtotal = %subtotal,
                stored_total = %order.total,
                computed_total = %total,
                "Stored order totals disagree with its items"
            );
            return Err(OrderError::internal(format!(
                "receipt totals for {} do not match the stored order",
                order.id
            )));
        }

        Ok(Self {
            order_id: order.id,
            placed_at: order.created_at,
            customer_name: customer.map(|user| user.name.clone()),
            customer_email: customer.map(|user| user.email.clone()),
            lines,
            subtotal,
            discount: order.discount_amount,
            coupon_code: order.coupon_code.clone(),
            delivery_charge: order.delivery_charge,
            total,
            delivery_address: order.delivery_address.one_line(),
            coordinates: order.delivery_address.coordinates,
            payment_method: order.payment_method,
            payment_status: order.payment_status,
            transaction_id: order.transaction_id.clone(),
            status: order.status,
            restaurant_status: order.restaurant_status,
            rejection_reason: order.rejection_reason.clone(),
            currency: currency.to_string(),
        })
    }

    fn money(&self, amount: Decimal) -> String {
        format!("{} {:.2}", self.currency, amount)
    }
}

impl Display for ReceiptView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Order {} ({})", self.order_id, self.status)?;
        writeln!(f, "Placed {}", self.placed_at.format("%Y-%m-%d %H:%M UTC"))?;
        if let Some(name) = &self.customer_name {
            writeln!(f, "Customer: {name}")?;
        }
        writeln!(f, "Deliver to: {}", self.delivery_address)?;

        let mut builder = Builder::default();
        builder.push_record(["Item", "Qty", "Unit price", "Amount"]);
        for line in &self.lines {
            builder.push_record([
                line.name.clone(),
                line.quantity.to_string(),
                self.money(line.unit_price),
                self.money(line.line_total),
            ]);
        }
        let mut table = builder.build();
        table.with(Style::modern_rounded());
        table.modify(Columns::new(1..), Alignment::right());
        table.modify(Rows::first(), Alignment::center());
        writeln!(f, "{table}")?;

        writeln!(f, "Subtotal: {}", self.money(self.subtotal))?;
        if !self.discount.is_zero() {
            match &self.coupon_code {
                Some(code) => writeln!(f, "Discount ({code}): -{}", self.money(self.discount))?,
                None => writeln!(f, "Discount: -{}", self.money(self.discount))?,
            }
        }
        if self.delivery_charge.is_zero() {
            writeln!(f, "Delivery: FREE")?;
        } else {
            writeln!(f, "Delivery: {}", self.money(self.delivery_charge))?;
        }
        writeln!(f, "Total: {}", self.money(self.total))?;

        write!(f, "Payment: {} ({})", self.payment_method, self.payment_status)?;
        if let Some(transaction_id) = &self.transaction_id {
            write!(f, ", ref {transaction_id}")?;
        }
        if let Some(reason) = &self.rejection_reason {
            write!(f, "\nRejected: {reason}")?;
        }
        Ok(())
    }
}

/// Loads an order and its customer and projects the receipt.
///
/// A customer that can no longer be read leaves the name blank; the order
/// is what the receipt is about.
pub async fn get_receipt(
    orders: &OrderClient,
    users: &UserClient,
    id: OrderId,
    currency: &str,
) -> Result<ReceiptView, OrderError> {
    let order = orders.get_order(id).await?;
    let customer = match users.get(order.user_id).await {
        Ok(user) => user,
        Err(e) => {
            warn!(order_id = %id, user_id = %order.user_id, error = %e, "Customer lookup failed for receipt");
            None
        }
    };
    ReceiptView::project(&order, customer.as_ref(), currency)
}
