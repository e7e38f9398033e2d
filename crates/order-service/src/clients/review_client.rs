//! # Review Client
//!
//! Posting reviews and reading them back, newest first.

use crate::model::{ProductId, RestaurantId, Review, ReviewCreate, ReviewId};
use crate::review_actor::ReviewError;
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use std::cmp::Reverse;
use tracing::{debug, info, instrument};

#[derive(Clone)]
pub struct ReviewClient {
    inner: ResourceClient<Review>,
}

impl ReviewClient {
    pub fn new(inner: ResourceClient<Review>) -> Self {
        Self { inner }
    }

    /// Stores a review and counts it into the restaurant's rating.
    #[instrument(skip(self, params), fields(user_id = %params.user_id, restaurant_id = %params.restaurant_id))]
    pub async fn post_review(&self, params: ReviewCreate) -> Result<ReviewId, ReviewError> {
        debug!(rating = params.rating, "Sending request");
        let id = self.inner.create(params).await.map_err(Self::map_error)?;
        info!(review_id = %id, "Review stored");
        Ok(id)
    }

    pub async fn reviews_for_restaurant(
        &self,
        restaurant_id: RestaurantId,
    ) -> Result<Vec<Review>, ReviewError> {
        self.newest_first(|review| review.restaurant_id == restaurant_id)
            .await
    }

    pub async fn reviews_for_product(&self, product_id: ProductId) -> Result<Vec<Review>, ReviewError> {
        self.newest_first(|review| review.product_id == Some(product_id))
            .await
    }

    async fn newest_first(&self, keep: impl Fn(&Review) -> bool) -> Result<Vec<Review>, ReviewError> {
        let mut reviews: Vec<Review> = self.list().await?.into_iter().filter(|r| keep(r)).collect();
        reviews.sort_by_key(|review| Reverse((review.created_at, review.id)));
        Ok(reviews)
    }
}

#[async_trait]
impl ActorClient<Review> for ReviewClient {
    type Error = ReviewError;

    fn inner(&self) -> &ResourceClient<Review> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e.into_entity_error::<ReviewError>() {
            Ok(e) => e,
            Err(FrameworkError::NotFound(id)) => ReviewError::NotFound(id),
            Err(other) => ReviewError::ActorCommunicationError(other.to_string()),
        }
    }
}
