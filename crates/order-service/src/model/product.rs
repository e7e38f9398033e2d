/// A menu item in the catalog.
///
/// # Actor Framework
/// This struct implements the [`ActorEntity`](actor_framework::ActorEntity) trait.
/// See [`impl ActorEntity for Product`](#impl-ActorEntity-for-Product) for:
/// - Creation parameters ([`ProductCreate`])
/// - Update parameters ([`ProductUpdate`])
/// - Custom actions ([`ProductAction`](crate::product_actor::ProductAction))
use crate::model::RestaurantId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(pub u32);

impl From<u32> for ProductId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "product_{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub restaurant_id: RestaurantId,
    pub name: String,
    pub price: Decimal,
    pub stock: u32,
    pub is_available: bool,
    pub preparation_time_minutes: Option<u32>,
}

/// DTO for Product creation.
#[derive(Debug, Clone)]
pub struct ProductCreate {
    pub restaurant_id: RestaurantId,
    pub name: String,
    pub price: Decimal,
    pub stock: u32,
    pub is_available: bool,
    pub preparation_time_minutes: Option<u32>,
}

impl ProductCreate {
    /// An available product with the given stock.
    pub fn new(restaurant_id: RestaurantId, name: impl Into<String>, price: Decimal, stock: u32) -> Self {
        Self {
            restaurant_id,
            name: name.into(),
            price,
            stock,
            is_available: true,
            preparation_time_minutes: None,
        }
    }
}

/// DTO for Product updates. Price edits never touch orders already placed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<u32>,
    pub is_available: Option<bool>,
}
