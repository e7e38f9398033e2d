//! # System Lifecycle
//!
//! Starting, wiring and stopping the actors.
//!
//! Actors are created first, without dependencies, and only receive their
//! context when they start running. The Order actor's context holds clones
//! of the user, product, restaurant and coupon clients, the Review actor's
//! of the user, product and restaurant clients:
//!
//! ```text
//! OrderSystem
//!   ├─ User actor        Context = ()
//!   ├─ Product actor     Context = ()
//!   ├─ Restaurant actor  Context = ()
//!   ├─ Coupon actor      Context = ()
//!   ├─ Order actor       Context = OrderContext { users, products, restaurants, coupons, .. }
//!   └─ Review actor      Context = ReviewContext { users, products, restaurants, clock }
//! ```
//!
//! ## Shutdown
//!
//! Dropping the system's clients closes the Order and Review actors'
//! channels. Each then exits and drops its context, which closes the channels of the
//! actors it depends on. The graph is acyclic, so every actor stops.
//!
//! Tracing is set up with [`actor_framework::tracing::setup_tracing`]:
//!
//! ```bash
//! RUST_LOG=info cargo run -p order-service
//! RUST_LOG=debug cargo run -p order-service   # request payloads
//! ```

pub mod order_system;

pub use order_system::*;
