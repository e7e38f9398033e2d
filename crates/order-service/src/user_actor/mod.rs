//! # User Actor
//!
//! Customer records. Orders read them to check that the customer exists and
//! receipts read them for the name and email.

pub mod entity;
pub mod error;

pub use error::*;

use crate::model::User;
use actor_framework::{ResourceActor, ResourceClient};

/// Creates a new User actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<User>, ResourceClient<User>) {
    ResourceActor::new(buffer_size)
}
