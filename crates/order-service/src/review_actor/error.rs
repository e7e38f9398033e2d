//! Error types for the Review actor.

use crate::model::{ProductId, RestaurantId, UserId, MAX_COMMENT_CHARS};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReviewError {
    #[error("Review not found: {0}")]
    NotFound(String),

    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error("Review comment must not be empty")]
    EmptyComment,

    #[error("Review comment is {chars} characters, the limit is {limit}", limit = MAX_COMMENT_CHARS)]
    CommentTooLong { chars: usize },

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Restaurant not found: {0}")]
    RestaurantNotFound(RestaurantId),

    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("{product_id} is not sold by {restaurant_id}")]
    ProductNotSoldHere {
        product_id: ProductId,
        restaurant_id: RestaurantId,
    },

    #[error("Reviews cannot be changed once posted")]
    Immutable,

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
