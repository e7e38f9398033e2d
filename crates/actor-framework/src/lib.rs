//! # Actor Framework
//!
//! Building blocks for resource-oriented actor systems on Tokio. Each resource
//! type (users, products, coupons, restaurants, orders) is owned by one
//! [`ResourceActor`] that applies requests to its records one at a time. Other
//! tasks talk to it through a cheap, cloneable [`ResourceClient`].
//!
//! Because an actor handles a single message at a time, a validation and the
//! mutation that depends on it can never interleave with another request for
//! the same resource. That is what makes "check the usage cap, then count the
//! redemption" atomic without a lock.
//!
//! ## Layers
//!
//! 1. **Entity** ([`ActorEntity`]): the record, its DTOs, actions and hooks.
//! 2. **Runtime** ([`ResourceActor`]): the message loop, id allocation, rollback.
//! 3. **Interface** ([`ResourceClient`], [`ActorClient`]): typed request/reply.
//!
//! ## Example
//!
//! ```rust
//! use actor_framework::{ActorEntity, ResourceActor};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug)]
//! struct Table {
//!     id: u32,
//!     seats: u8,
//!     occupied: bool,
//! }
//!
//! #[derive(Debug)] struct TableCreate { seats: u8 }
//! #[derive(Debug)] struct TableUpdate { seats: Option<u8> }
//! #[derive(Debug)] enum TableAction { Seat }
//! #[derive(Debug, thiserror::Error)]
//! #[error("table already occupied")]
//! struct Occupied;
//!
//! #[async_trait]
//! impl ActorEntity for Table {
//!     type Id = u32;
//!     type Create = TableCreate;
//!     type Update = TableUpdate;
//!     type Action = TableAction;
//!     type ActionResult = ();
//!     type Context = ();
//!     type Error = Occupied;
//!
//!     fn from_create_params(id: u32, params: TableCreate) -> Result<Self, Self::Error> {
//!         Ok(Self { id, seats: params.seats, occupied: false })
//!     }
//!
//!     async fn on_update(&mut self, update: TableUpdate, _: &()) -> Result<(), Self::Error> {
//!         if let Some(seats) = update.seats { self.seats = seats; }
//!         Ok(())
//!     }
//!
//!     async fn handle_action(&mut self, action: TableAction, _: &()) -> Result<(), Self::Error> {
//!         match action {
//!             TableAction::Seat if self.occupied => Err(Occupied),
//!             TableAction::Seat => {
//!                 self.occupied = true;
//!                 Ok(())
//!             }
//!         }
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, client) = ResourceActor::<Table>::new(10);
//!     tokio::spawn(actor.run(()));
//!
//!     let id = client.create(TableCreate { seats: 4 }).await.unwrap();
//!     client.perform_action(id, TableAction::Seat).await.unwrap();
//!
//!     // The second guest loses the race and gets the entity's own error back.
//!     let err = client.perform_action(id, TableAction::Seat).await.unwrap_err();
//!     assert!(err.into_entity_error::<Occupied>().is_ok());
//! }
//! ```
//!
//! ## Context Injection
//!
//! Dependencies are passed to [`ResourceActor::run`], not to the constructor.
//! All actors are created first, then each is started with the clients of the
//! actors it needs, so two actors may depend on each other.
//!
//! ## Keys, Revisions and Rollback
//!
//! - [`ResourceActor::new`] generates sequential ids; [`ResourceActor::keyed`] stores
//!   entities under natural keys only (`insert`, `get_or_create`), e.g. coupon codes.
//! - [`ActorEntity::revision`] feeds [`ResourceClient::perform_action_if`], a
//!   compare-and-swap: the action runs only if nobody changed the entity since the
//!   caller read it, otherwise [`FrameworkError::Conflict`] is returned.
//! - A failed `on_update` or `handle_action` leaves the stored entity exactly as it was.
//!
//! ## Testing
//!
//! The [`mock`] module hands out real `ResourceClient<T>` handles answered from
//! scripted expectations, so client logic and actors with dependencies can be
//! tested without spawning those dependencies.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;
pub mod tracing;

// Re-export core types for convenience
pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{ResourceRequest, Response};
