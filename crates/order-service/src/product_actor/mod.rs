//! # Product Actor
//!
//! The catalog store. Besides CRUD it exposes stock actions used when stock
//! is taken at acceptance time:
//!
//! ```rust,ignore
//! let left = product_client.reserve_stock(product_id, 2).await?;
//! product_client.release_stock(product_id, 2).await?;
//! ```
//!
//! Order placement only reads products. The price it snapshots is whatever
//! the product holds at that moment; later `ProductUpdate`s do not reach
//! existing orders.

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::model::Product;
use actor_framework::{ResourceActor, ResourceClient};

/// Creates a new Product actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Product>, ResourceClient<Product>) {
    ResourceActor::new(buffer_size)
}
