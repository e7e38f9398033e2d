//! Error types for the Restaurant actor.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RestaurantError {
    #[error("Restaurant not found: {0}")]
    NotFound(String),

    #[error("Restaurant name must not be empty")]
    EmptyName,

    #[error("Restaurant {0} must be approved before it can open")]
    NotApproved(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
