//! [`ActorEntity`] implementation for [`Review`].

use super::context::ReviewContext;
use super::error::ReviewError;
use crate::model::{Review, ReviewCreate, ReviewId, MAX_COMMENT_CHARS};
use crate::product_actor::ProductError;
use crate::restaurant_actor::RestaurantError;
use crate::user_actor::UserError;
use actor_framework::{ActorClient, ActorEntity};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

/// Trimmed comment, or why it is refused.
fn clean_comment(raw: &str) -> Result<String, ReviewError> {
    let comment = raw.trim();
    if comment.is_empty() {
        return Err(ReviewError::EmptyComment);
    }
    let chars = comment.chars().count();
    if chars > MAX_COMMENT_CHARS {
        return Err(ReviewError::CommentTooLong { chars });
    }
    Ok(comment.to_string())
}

#[async_trait]
impl ActorEntity for Review {
    type Id = ReviewId;
    type Create = ReviewCreate;
    type Update = ();
    type Action = ();
    type ActionResult = ();
    type Context = ReviewContext;
    type Error = ReviewError;

    fn from_create_params(id: ReviewId, params: ReviewCreate) -> Result<Self, Self::Error> {
        if !(1..=5).contains(&params.rating) {
            return Err(ReviewError::InvalidRating(params.rating));
        }
        Ok(Self {
            id,
            user_id: params.user_id,
            restaurant_id: params.restaurant_id,
            product_id: params.product_id,
            rating: params.rating,
            comment: clean_comment(&params.comment)?,
            // Set in on_create.
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        })
    }

    /// Checks the author and the product, then counts the stars into the
    /// restaurant's rating. That last call also proves the restaurant exists.
    async fn on_create(&mut self, ctx: &ReviewContext) -> Result<(), Self::Error> {
        match ctx.users.get(self.user_id).await {
            Ok(Some(_)) => {}
            Ok(None) | Err(UserError::NotFound(_)) => {
                return Err(ReviewError::UserNotFound(self.user_id))
            }
            Err(e) => return Err(ReviewError::ActorCommunicationError(e.to_string())),
        }

        if let Some(product_id) = self.product_id {
            match ctx.products.get(product_id).await {
                Ok(Some(product)) if product.restaurant_id == self.restaurant_id => {}
                Ok(Some(_)) => {
                    return Err(ReviewError::ProductNotSoldHere {
                        product_id,
                        restaurant_id: self.restaurant_id,
                    })
                }
                Ok(None) | Err(ProductError::NotFound(_)) => {
                    return Err(ReviewError::ProductNotFound(product_id))
                }
                Err(e) => return Err(ReviewError::ActorCommunicationError(e.to_string())),
            }
        }

        let restaurant = match ctx.restaurants.add_rating(self.restaurant_id, self.rating).await {
            Ok(restaurant) => restaurant,
            Err(RestaurantError::NotFound(_)) => {
                return Err(ReviewError::RestaurantNotFound(self.restaurant_id))
            }
            Err(e) => return Err(ReviewError::ActorCommunicationError(e.to_string())),
        };

        self.created_at = ctx.clock.now();
        info!(
            review_id = %self.id,
            restaurant_id = %self.restaurant_id,
            rating = self.rating,
            average = %restaurant.rating.average(),
            total_reviews = restaurant.rating.total_reviews,
            "Review posted"
        );
        Ok(())
    }

    async fn on_update(&mut self, _update: (), _ctx: &ReviewContext) -> Result<(), Self::Error> {
        Err(ReviewError::Immutable)
    }

    async fn on_delete(&self, _ctx: &ReviewContext) -> Result<(), Self::Error> {
        Err(ReviewError::Immutable)
    }

    async fn handle_action(&mut self, _action: (), _ctx: &ReviewContext) -> Result<(), Self::Error> {
        Ok(())
    }
}
