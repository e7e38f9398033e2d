use actor_framework::{ActorClient, ActorEntity, FrameworkError, ResourceActor, ResourceClient};
use async_trait::async_trait;

// --- Test Entity ---

#[derive(Clone, Debug, PartialEq)]
struct Rider {
    id: u32,
    name: String,
    on_shift: bool,
    deliveries: u32,
    revision: u64,
}

#[derive(Debug)]
struct RiderCreate {
    name: String,
}

#[derive(Debug)]
struct RiderUpdate {
    name: Option<String>,
}

#[derive(Debug)]
enum RiderAction {
    StartShift,
    Deliver,
}

#[derive(Debug, thiserror::Error, PartialEq)]
enum RiderError {
    #[error("rider name must not be empty")]
    EmptyName,
    #[error("rider is off shift")]
    OffShift,
    #[error("riders with deliveries cannot be removed")]
    HasHistory,
    #[error("{0}")]
    Framework(String),
}

#[async_trait]
impl ActorEntity for Rider {
    type Id = u32;
    type Create = RiderCreate;
    type Update = RiderUpdate;
    type Action = RiderAction;
    type ActionResult = u32;
    type Context = ();
    type Error = RiderError;

    fn from_create_params(id: u32, params: RiderCreate) -> Result<Self, Self::Error> {
        if params.name.trim().is_empty() {
            return Err(RiderError::EmptyName);
        }
        Ok(Self {
            id,
            name: params.name,
            on_shift: false,
            deliveries: 0,
            revision: 0,
        })
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    async fn on_update(&mut self, update: RiderUpdate, _ctx: &()) -> Result<(), Self::Error> {
        if let Some(name) = update.name {
            self.name = name;
            self.revision += 1;
        }
        Ok(())
    }

    async fn on_delete(&self, _ctx: &()) -> Result<(), Self::Error> {
        if self.deliveries > 0 {
            return Err(RiderError::HasHistory);
        }
        Ok(())
    }

    async fn handle_action(&mut self, action: RiderAction, _ctx: &()) -> Result<u32, Self::Error> {
        match action {
            RiderAction::StartShift => {
                if !self.on_shift {
                    self.on_shift = true;
                    self.revision += 1;
                }
            }
            RiderAction::Deliver => {
                if !self.on_shift {
                    return Err(RiderError::OffShift);
                }
                self.deliveries += 1;
                self.revision += 1;
            }
        }
        Ok(self.deliveries)
    }
}

struct RiderClient {
    inner: ResourceClient<Rider>,
}

#[async_trait]
impl ActorClient<Rider> for RiderClient {
    type Error = RiderError;

    fn inner(&self) -> &ResourceClient<Rider> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> RiderError {
        e.into_entity_error::<RiderError>()
            .unwrap_or_else(|other| RiderError::Framework(other.to_string()))
    }
}

// --- Tests ---

#[tokio::test]
async fn rider_full_lifecycle() {
    let (actor, client) = ResourceActor::<Rider>::new(10);
    tokio::spawn(actor.run(()));

    let id = client
        .create(RiderCreate {
            name: "Sita".into(),
        })
        .await
        .unwrap();
    assert_eq!(id, 1);

    let renamed = client
        .update(
            id,
            RiderUpdate {
                name: Some("Sita K.".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Sita K.");

    client.perform_action(id, RiderAction::StartShift).await.unwrap();
    // Starting an already started shift changes nothing.
    client.perform_action(id, RiderAction::StartShift).await.unwrap();
    assert_eq!(client.get(id).await.unwrap().unwrap().revision, 2);

    let count = client.perform_action(id, RiderAction::Deliver).await.unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn invalid_create_is_never_stored() {
    let (actor, client) = ResourceActor::<Rider>::new(10);
    tokio::spawn(actor.run(()));

    let err = client
        .create(RiderCreate { name: "  ".into() })
        .await
        .unwrap_err();
    assert_eq!(err.into_entity_error::<RiderError>().unwrap(), RiderError::EmptyName);
    assert!(client.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn typed_client_surfaces_entity_errors() {
    let (actor, inner) = ResourceActor::<Rider>::new(10);
    tokio::spawn(actor.run(()));
    let riders = RiderClient {
        inner: inner.clone(),
    };

    let id = inner
        .create(RiderCreate { name: "Ram".into() })
        .await
        .unwrap();

    let off_shift = inner.perform_action(id, RiderAction::Deliver).await.unwrap_err();
    assert_eq!(RiderClient::map_error(off_shift), RiderError::OffShift);

    inner.perform_action(id, RiderAction::StartShift).await.unwrap();
    inner.perform_action(id, RiderAction::Deliver).await.unwrap();

    // on_delete vetoes the removal and the rider stays listed.
    assert_eq!(riders.delete(id).await, Err(RiderError::HasHistory));
    assert_eq!(riders.list().await.unwrap().len(), 1);
    assert!(riders.get(id).await.unwrap().is_some());
}

#[tokio::test]
async fn concurrent_conditional_actions_have_one_winner() {
    let (actor, client) = ResourceActor::<Rider>::new(32);
    tokio::spawn(actor.run(()));

    let id = client
        .create(RiderCreate {
            name: "Hari".into(),
        })
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client.perform_action_if(id, 0, RiderAction::StartShift).await
        }));
    }

    let mut wins = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => wins += 1,
            Err(FrameworkError::Conflict { expected: 0, actual: 1 }) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(wins, 1);
    assert_eq!(conflicts, 7);
}

#[tokio::test]
async fn missing_ids_report_not_found() {
    let (actor, client) = ResourceActor::<Rider>::new(10);
    tokio::spawn(actor.run(()));

    assert!(client.get(42).await.unwrap().is_none());
    assert!(matches!(
        client.perform_action(42, RiderAction::Deliver).await,
        Err(FrameworkError::NotFound(_))
    ));
    assert!(matches!(
        client.delete(42).await,
        Err(FrameworkError::NotFound(_))
    ));
}

#[tokio::test]
async fn dropped_actor_is_unreachable() {
    let (actor, client) = ResourceActor::<Rider>::new(10);
    drop(actor);

    let err = client.get(1).await.unwrap_err();
    assert!(err.is_unreachable());
}
