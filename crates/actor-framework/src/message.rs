//! # Generic Messages
//!
//! The request type sent from a [`ResourceClient`](crate::ResourceClient) to
//! its [`ResourceActor`](crate::ResourceActor), and the one-shot reply channel.

use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Internal message type sent to the actor to request operations.
///
/// The variants are the lifecycle of a stored resource (create, read, update,
/// delete) plus `Action` for resource-specific logic. All of them are generic
/// over `T: ActorEntity`, so a product payload can never reach an order actor.
///
/// - **Create**: store a new entity under the next generated id.
/// - **Insert**: store a new entity under a caller-supplied (natural) key.
/// - **GetOrCreate**: return the entity under a key, creating it from defaults if missing.
/// - **Get** / **List**: read one / all entities.
/// - **Update**: apply an update DTO.
/// - **Delete**: remove the entity, if its `on_delete` hook allows it.
/// - **Action** / **ActionIf**: run a custom action, optionally guarded by the
///   entity revision the caller last saw.
#[derive(Debug)]
pub enum ResourceRequest<T: ActorEntity> {
    Create {
        params: T::Create,
        respond_to: Response<T::Id>,
    },
    Insert {
        id: T::Id,
        params: T::Create,
        respond_to: Response<T::Id>,
    },
    GetOrCreate {
        id: T::Id,
        params: T::Create,
        respond_to: Response<T>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    List {
        respond_to: Response<Vec<T>>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
    ActionIf {
        id: T::Id,
        expected_revision: u64,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
}
