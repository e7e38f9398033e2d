/// A placed order.
///
/// # Actor Framework
/// This struct implements the [`ActorEntity`](actor_framework::ActorEntity) trait.
/// See [`impl ActorEntity for Order`](#impl-ActorEntity-for-Order) for:
/// - Creation parameters ([`OrderCreate`]), assembled in `on_create`
/// - Transitions ([`OrderAction`](crate::order_actor::OrderAction))
use crate::model::money::{checked_sum, line_total};
use crate::model::{CouponCode, DeliveryAddress, ProductId, RestaurantId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Type-safe identifier for Orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub u32);

impl From<u32> for OrderId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "order_{}", self.0)
    }
}

/// Kitchen-side progress, driven by the restaurant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestaurantStatus {
    Pending,
    Accepted,
    Preparing,
    Ready,
    Rejected,
}

/// Overall lifecycle of the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Draft,
    Pending,
    Preparing,
    Delivering,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn is_cancellable(self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Preparing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Esewa,
    Khalti,
}

impl PaymentMethod {
    /// Paid through a gateway before delivery.
    pub fn is_prepaid(self) -> bool {
        !matches!(self, PaymentMethod::Cash)
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "esewa" => Ok(PaymentMethod::Esewa),
            "khalti" => Ok(PaymentMethod::Khalti),
            other => Err(format!("unknown payment method '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

/// What the payment gateway (or the rider, for cash) reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentOutcome {
    Completed,
    Failed,
}

macro_rules! lowercase_display {
    ($($ty:ty),+) => {$(
        impl Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let name = format!("{self:?}");
                f.write_str(&name.to_lowercase())
            }
        }
    )+};
}

lowercase_display!(RestaurantStatus, OrderStatus, PaymentMethod, PaymentStatus, PaymentOutcome);

/// Who asked for a cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "by", content = "userId")]
pub enum Initiator {
    Customer(UserId),
    Restaurant,
    Admin,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cancellation {
    pub by: Initiator,
    pub reason: Option<String>,
    pub at: DateTime<Utc>,
}

/// One line of an order with the price captured at placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl OrderItem {
    /// `None` when the amount does not fit a `Decimal`.
    pub fn line_total(&self) -> Option<Decimal> {
        line_total(self.unit_price, self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub restaurant_id: RestaurantId,
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub coupon_code: Option<CouponCode>,
    pub delivery_charge: Decimal,
    pub total: Decimal,
    pub delivery_address: DeliveryAddress,
    pub restaurant_status: RestaurantStatus,
    pub rejection_reason: Option<String>,
    pub preparation_time_minutes: Option<u32>,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub cancellation: Option<Cancellation>,
    /// Stock was taken from the catalog for this order and must be given back
    /// if it is cancelled.
    pub stock_reserved: bool,
    pub revision: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Sum of the item lines, from the price snapshots. `None` on overflow.
    pub fn items_subtotal(&self) -> Option<Decimal> {
        self.items
            .iter()
            .map(OrderItem::line_total)
            .collect::<Option<Vec<_>>>()
            .and_then(checked_sum)
    }

    /// `subtotal - discount + delivery` as it must be stored. `None` on overflow.
    pub fn expected_total(&self) -> Option<Decimal> {
        self.subtotal
            .checked_sub(self.discount_amount)?
            .checked_add(self.delivery_charge)
    }

    /// The stored money fields agree with the item snapshots.
    pub fn totals_consistent(&self) -> bool {
        self.items_subtotal() == Some(self.subtotal)
            && self.discount_amount <= self.subtotal
            && self.expected_total() == Some(self.total)
    }

    /// A failed gateway payment keeps the order at `pending`.
    pub fn is_payment_hold(&self) -> bool {
        self.payment_method.is_prepaid() && self.payment_status == PaymentStatus::Failed
    }
}

/// One cart line: which product and how many.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Payload for placing an order. Prices are looked up by the order actor,
/// never taken from the caller.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub user_id: UserId,
    pub restaurant_id: RestaurantId,
    pub items: Vec<CartItem>,
    pub delivery_address: DeliveryAddress,
    pub coupon_code: Option<CouponCode>,
    pub payment_method: PaymentMethod,
}
