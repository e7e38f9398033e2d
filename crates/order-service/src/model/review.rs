/// A customer's review of a restaurant, optionally about one of its products.
///
/// # Actor Framework
/// This struct implements the [`ActorEntity`](actor_framework::ActorEntity) trait.
/// See [`impl ActorEntity for Review`](#impl-ActorEntity-for-Review) for:
/// - Creation parameters ([`ReviewCreate`]), checked against users, restaurants
///   and products in `on_create`
use crate::model::{ProductId, RestaurantId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Longest comment accepted, in characters, after trimming.
pub const MAX_COMMENT_CHARS: usize = 500;

/// Type-safe identifier for Reviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReviewId(pub u32);

impl From<u32> for ReviewId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for ReviewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "review_{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub user_id: UserId,
    pub restaurant_id: RestaurantId,
    pub product_id: Option<ProductId>,
    /// 1 to 5 stars.
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// DTO for Review creation.
#[derive(Debug, Clone)]
pub struct ReviewCreate {
    pub user_id: UserId,
    pub restaurant_id: RestaurantId,
    pub product_id: Option<ProductId>,
    pub rating: u8,
    pub comment: String,
}
