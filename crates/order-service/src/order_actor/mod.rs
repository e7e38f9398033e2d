//! # Order Actor
//!
//! One actor owns every order. Because it handles one message at a time,
//! each transition is a compare-and-swap on the stored order: it reads the
//! current state, checks it and writes the new state with nothing in
//! between. Callers that decided on a transition after reading an order can
//! make that explicit with a revision check (see
//! [`OrderClient::transition_if_revision`](crate::clients::OrderClient::transition_if_revision)).
//!
//! ```text
//! restaurant_status: pending ─► accepted ─► preparing ─► ready
//!                       └─► rejected (order cancelled)
//! status:            pending ─► preparing ─► delivering ─► delivered
//!                       └───────────┴─► cancelled
//! ```

pub mod actions;
pub mod assembler;
pub mod context;
pub mod entity;
pub mod error;
pub mod machine;
mod stock;

pub use actions::*;
pub use context::OrderContext;
pub use error::*;

use crate::model::Order;
use actor_framework::{ResourceActor, ResourceClient};

/// Creates a new Order actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Order>, ResourceClient<Order>) {
    ResourceActor::new(buffer_size)
}
