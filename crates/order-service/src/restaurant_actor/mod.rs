//! # Restaurant Actor
//!
//! Restaurants are approved by an admin before they can take orders. The
//! record behind an approval may not exist yet (the owner signed up but the
//! profile was never created), so approval goes through
//! [`RestaurantClient::approve`](crate::clients::RestaurantClient::approve):
//! a get-or-create followed by the `Approve` action, instead of ad hoc
//! existence checks at every caller.

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::model::Restaurant;
use actor_framework::{ResourceActor, ResourceClient};

/// Creates a new Restaurant actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Restaurant>, ResourceClient<Restaurant>) {
    ResourceActor::new(buffer_size)
}
