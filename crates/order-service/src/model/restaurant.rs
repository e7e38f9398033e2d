use crate::model::UserId;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Restaurants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RestaurantId(pub u32);

impl From<u32> for RestaurantId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for RestaurantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "restaurant_{}", self.0)
    }
}

/// A restaurant that sells through the platform.
///
/// Only approved and active restaurants accept orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: RestaurantId,
    pub owner: UserId,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub cuisine: Vec<String>,
    pub is_approved: bool,
    pub is_active: bool,
    #[serde(default)]
    pub rating: RatingSummary,
}

impl Restaurant {
    pub fn accepts_orders(&self) -> bool {
        self.is_approved && self.is_active
    }
}

/// Running total of the star ratings a restaurant received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub total_reviews: u32,
    pub stars: u64,
}

impl RatingSummary {
    pub fn add(&mut self, stars: u8) {
        self.total_reviews = self.total_reviews.saturating_add(1);
        self.stars = self.stars.saturating_add(u64::from(stars));
    }

    /// Mean rating to one decimal place, zero before the first review.
    pub fn average(&self) -> Decimal {
        if self.total_reviews == 0 {
            return Decimal::ZERO;
        }
        (Decimal::from(self.stars) / Decimal::from(self.total_reviews))
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
    }
}

/// DTO for Restaurant creation, also used as the defaults when an approval
/// finds no record yet.
#[derive(Debug, Clone)]
pub struct RestaurantCreate {
    pub owner: UserId,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub cuisine: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestaurantUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub cuisine: Option<Vec<String>>,
}
