//! # Coupon Actor
//!
//! Coupons are keyed by their code ([`ResourceActor::keyed`]). Redemption is
//! a single `Redeem` action that evaluates the coupon and counts the use in
//! the same message, so two orders racing for the last use of a coupon are
//! applied one after the other and the second gets `CouponExhausted`.
//!
//! `Release` gives a use back when the order that redeemed it could not be
//! stored.

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::model::Coupon;
use actor_framework::{ResourceActor, ResourceClient};

/// Creates a new Coupon actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Coupon>, ResourceClient<Coupon>) {
    ResourceActor::keyed(buffer_size)
}
