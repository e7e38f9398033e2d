//! # Generic Actor Server
//!
//! This module defines the `ResourceActor`, the component that owns the
//! records of one resource type and applies requests to them one at a time.

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::ResourceRequest;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

type IdGenerator<Id> = Box<dyn FnMut() -> Id + Send>;

/// The generic actor that manages a collection of entities.
///
/// The actor owns its `store` and the receiving end of the channel. Messages
/// are processed sequentially, so a check and the mutation that depends on it
/// always run without interleaving: two clients racing to change the same
/// record are applied one after the other, and the second sees the first's
/// result. No `Mutex` is needed around the store.
///
/// # Usage Pattern
///
/// 1.  **Create**: `ResourceActor::new()` (generated ids) or
///     `ResourceActor::keyed()` (natural keys) returns the actor and a client.
/// 2.  **Wire**: pass dependencies (other clients) into `actor.run(context)`.
/// 3.  **Run**: spawn the run loop in a background task.
///
/// ```rust
/// use actor_framework::{ActorEntity, ResourceActor};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)] struct Counter { id: u32, hits: u32 }
/// #[derive(Debug)] struct CounterCreate;
/// #[derive(Debug)] struct CounterUpdate;
/// #[derive(Debug)] enum CounterAction { Hit }
/// #[derive(Debug, thiserror::Error)] #[error("counter error")] struct CounterError;
///
/// #[async_trait]
/// impl ActorEntity for Counter {
///     type Id = u32;
///     type Create = CounterCreate;
///     type Update = CounterUpdate;
///     type Action = CounterAction;
///     type ActionResult = u32;
///     type Context = ();
///     type Error = CounterError;
///
///     fn from_create_params(id: u32, _: CounterCreate) -> Result<Self, Self::Error> {
///         Ok(Self { id, hits: 0 })
///     }
///     async fn on_update(&mut self, _: CounterUpdate, _: &()) -> Result<(), Self::Error> { Ok(()) }
///     async fn handle_action(&mut self, _: CounterAction, _: &()) -> Result<u32, Self::Error> {
///         self.hits += 1;
///         Ok(self.hits)
///     }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, client) = ResourceActor::<Counter>::new(10);
///     tokio::spawn(actor.run(()));
///
///     let id = client.create(CounterCreate).await.unwrap();
///     assert_eq!(client.perform_action(id, CounterAction::Hit).await.unwrap(), 1);
/// }
/// ```
///
/// ## Operations
///
/// * **Create**: allocates the next free generated id, calls
///   `from_create_params` then `on_create`, and stores the entity.
/// * **Insert** / **GetOrCreate**: same, under a caller-supplied id.
/// * **Update** / **Action**: snapshot the entity, run the hook, and restore
///   the snapshot if the hook fails.
/// * **ActionIf**: like Action, but only when `revision()` matches.
/// * **Delete**: runs `on_delete`, then removes the entity.
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    next_id: Option<IdGenerator<T::Id>>,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates an actor that generates sequential ids (`1`, `2`, ...) for `Create`.
    ///
    /// # Arguments
    ///
    /// * `buffer_size` - The capacity of the MPSC channel. If the channel is full,
    ///   calls to the client will wait until there is space.
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>)
    where
        T::Id: From<u32>,
    {
        let mut counter: u32 = 0;
        let generator: IdGenerator<T::Id> = Box::new(move || {
            counter += 1;
            T::Id::from(counter)
        });
        Self::with_generator(buffer_size, Some(generator))
    }

    /// Creates an actor whose entities are only stored under caller-supplied
    /// keys (`Insert`, `GetOrCreate`). `Create` answers [`FrameworkError::KeyRequired`].
    pub fn keyed(buffer_size: usize) -> (Self, ResourceClient<T>) {
        Self::with_generator(buffer_size, None)
    }

    fn with_generator(
        buffer_size: usize,
        next_id: Option<IdGenerator<T::Id>>,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            next_id,
        };
        (actor, ResourceClient::new(sender))
    }

    /// Runs the actor's event loop, processing messages until the channel closes.
    ///
    /// # Context Injection
    /// The `context` argument is injected into every entity hook. This lets
    /// entities use clients of actors that were created after this one.
    pub async fn run(mut self, context: T::Context) {
        // Just the type name, e.g. "Order" rather than "order_service::model::order::Order"
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    debug!(entity_type, ?params, "Create");
                    let result = match self.allocate_id() {
                        Some(id) => self
                            .create_entity(id.clone(), params, &context, entity_type)
                            .await
                            .map(|_| id),
                        None => Err(FrameworkError::KeyRequired),
                    };
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Insert {
                    id,
                    params,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?params, "Insert");
                    let result = if self.store.contains_key(&id) {
                        warn!(entity_type, %id, "Already exists");
                        Err(FrameworkError::AlreadyExists(id.to_string()))
                    } else {
                        self.create_entity(id.clone(), params, &context, entity_type)
                            .await
                            .map(|_| id)
                    };
                    let _ = respond_to.send(result);
                }
                ResourceRequest::GetOrCreate {
                    id,
                    params,
                    respond_to,
                } => {
                    let result = match self.store.get(&id) {
                        Some(item) => {
                            debug!(entity_type, %id, found = true, "GetOrCreate");
                            Ok(item.clone())
                        }
                        None => {
                            info!(entity_type, %id, "Missing, creating from defaults");
                            self.create_entity(id, params, &context, entity_type).await
                        }
                    };
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    let found = item.is_some();
                    debug!(entity_type, %id, found, "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::List { respond_to } => {
                    debug!(entity_type, size = self.store.len(), "List");
                    let _ = respond_to.send(Ok(self.store.values().cloned().collect()));
                }
                ResourceRequest::Update {
                    id,
                    update,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?update, "Update");
                    let result = self.update_entity(id, update, &context, entity_type).await;
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Delete { id, respond_to } => {
                    debug!(entity_type, %id, "Delete");
                    let result = self.delete_entity(id, &context, entity_type).await;
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Action {
                    id,
                    action,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?action, "Action");
                    let result = self
                        .run_action(id, None, action, &context, entity_type)
                        .await;
                    let _ = respond_to.send(result);
                }
                ResourceRequest::ActionIf {
                    id,
                    expected_revision,
                    action,
                    respond_to,
                } => {
                    debug!(entity_type, %id, expected_revision, ?action, "ActionIf");
                    let result = self
                        .run_action(id, Some(expected_revision), action, &context, entity_type)
                        .await;
                    let _ = respond_to.send(result);
                }
            }
        }

        info!(entity_type, size = self.store.len(), "Shutdown");
    }

    /// Next generated id that is not already taken by a keyed insert.
    fn allocate_id(&mut self) -> Option<T::Id> {
        let next = self.next_id.as_mut()?;
        loop {
            let id = next();
            if !self.store.contains_key(&id) {
                return Some(id);
            }
        }
    }

    async fn create_entity(
        &mut self,
        id: T::Id,
        params: T::Create,
        context: &T::Context,
        entity_type: &str,
    ) -> Result<T, FrameworkError> {
        let mut item = match T::from_create_params(id.clone(), params) {
            Ok(item) => item,
            Err(e) => {
                warn!(entity_type, error = %e, "Create failed");
                return Err(FrameworkError::EntityError(Box::new(e)));
            }
        };
        if let Err(e) = item.on_create(context).await {
            warn!(entity_type, error = %e, "on_create failed");
            return Err(FrameworkError::EntityError(Box::new(e)));
        }
        self.store.insert(id.clone(), item.clone());
        info!(entity_type, %id, size = self.store.len(), "Created");
        Ok(item)
    }

    async fn update_entity(
        &mut self,
        id: T::Id,
        update: T::Update,
        context: &T::Context,
        entity_type: &str,
    ) -> Result<T, FrameworkError> {
        let Some(item) = self.store.get_mut(&id) else {
            warn!(entity_type, %id, "Not found");
            return Err(FrameworkError::NotFound(id.to_string()));
        };
        let snapshot = item.clone();
        match item.on_update(update, context).await {
            Ok(()) => {
                info!(entity_type, %id, "Updated");
                Ok(item.clone())
            }
            Err(e) => {
                *item = snapshot;
                warn!(entity_type, %id, error = %e, "Update failed");
                Err(FrameworkError::EntityError(Box::new(e)))
            }
        }
    }

    async fn delete_entity(
        &mut self,
        id: T::Id,
        context: &T::Context,
        entity_type: &str,
    ) -> Result<(), FrameworkError> {
        let Some(item) = self.store.get(&id) else {
            warn!(entity_type, %id, "Not found");
            return Err(FrameworkError::NotFound(id.to_string()));
        };
        if let Err(e) = item.on_delete(context).await {
            warn!(entity_type, %id, error = %e, "on_delete failed");
            return Err(FrameworkError::EntityError(Box::new(e)));
        }
        self.store.remove(&id);
        info!(entity_type, %id, size = self.store.len(), "Deleted");
        Ok(())
    }

    async fn run_action(
        &mut self,
        id: T::Id,
        expected_revision: Option<u64>,
        action: T::Action,
        context: &T::Context,
        entity_type: &str,
    ) -> Result<T::ActionResult, FrameworkError> {
        let Some(item) = self.store.get_mut(&id) else {
            warn!(entity_type, %id, "Not found");
            return Err(FrameworkError::NotFound(id.to_string()));
        };
        if let Some(expected) = expected_revision {
            let actual = item.revision();
            if actual != expected {
                warn!(entity_type, %id, expected, actual, "Revision conflict");
                return Err(FrameworkError::Conflict { expected, actual });
            }
        }
        let snapshot = item.clone();
        match item.handle_action(action, context).await {
            Ok(result) => {
                info!(entity_type, %id, "Action ok");
                Ok(result)
            }
            Err(e) => {
                *item = snapshot;
                warn!(entity_type, %id, error = %e, "Action failed");
                Err(FrameworkError::EntityError(Box::new(e)))
            }
        }
    }
}
