//! # Review Actor
//!
//! Star ratings and comments left by customers. A review is checked against
//! the user, the product (when it names one) and the restaurant before it is
//! stored, and counting it into the restaurant's rating is the last step of
//! `on_create`, so a review that is refused never moves the average.
//!
//! Reviews are never edited or removed once posted; the restaurant's running
//! total would drift from the stored reviews otherwise.

pub mod context;
pub mod entity;
pub mod error;

pub use context::ReviewContext;
pub use error::*;

use crate::model::Review;
use actor_framework::{ResourceActor, ResourceClient};

/// Creates a new Review actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Review>, ResourceClient<Review>) {
    ResourceActor::new(buffer_size)
}
