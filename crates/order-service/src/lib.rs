//! # Order Service
//!
//! Order placement and fulfillment for a food-ordering platform, built on
//! [`actor_framework`]: one actor per resource, typed clients in front of
//! each, and an Order actor that talks to the others through its context.
//!
//! - **[model]**: records and DTOs ([`model::Order`], [`model::Coupon`], ...).
//! - **[order_actor]**: order assembly and the order state machine.
//! - **[coupon_actor]**: coupon evaluation and atomic redemption.
//! - **[review_actor]**: reviews and the restaurant rating they feed.
//! - **[clients]**: typed clients, one per actor.
//! - **[receipt]** and **[reports]**: read-only projections of orders.
//! - **[request]**: the JSON request for placing an order.
//! - **[lifecycle]**: starting and stopping the whole system.
//!
//! ## Testing
//!
//! Unit tests live next to the code. `tests/` runs the full system and the
//! real Order actor against [`actor_framework::mock`] dependencies.

pub mod clients;
pub mod clock;
pub mod config;
pub mod coupon_actor;
pub mod geocoding;
pub mod lifecycle;
pub mod model;
pub mod order_actor;
pub mod product_actor;
pub mod receipt;
pub mod reports;
pub mod request;
pub mod restaurant_actor;
pub mod review_actor;
pub mod user_actor;
