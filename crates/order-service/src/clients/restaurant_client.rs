//! # Restaurant Client

use crate::model::{Restaurant, RestaurantCreate, RestaurantId, RestaurantUpdate};
use crate::restaurant_actor::{RestaurantAction, RestaurantError};
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

#[derive(Clone)]
pub struct RestaurantClient {
    inner: ResourceClient<Restaurant>,
}

impl RestaurantClient {
    pub fn new(inner: ResourceClient<Restaurant>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self))]
    pub async fn create_restaurant(
        &self,
        params: RestaurantCreate,
    ) -> Result<RestaurantId, RestaurantError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn update_restaurant(
        &self,
        id: RestaurantId,
        update: RestaurantUpdate,
    ) -> Result<Restaurant, RestaurantError> {
        debug!("Sending request");
        self.inner.update(id, update).await.map_err(Self::map_error)
    }

    /// Approves a restaurant, creating its record from `defaults` first if
    /// it does not exist yet.
    #[instrument(skip(self, defaults))]
    pub async fn approve(
        &self,
        id: RestaurantId,
        defaults: RestaurantCreate,
    ) -> Result<Restaurant, RestaurantError> {
        let existing = self
            .inner
            .get_or_create(id, defaults)
            .await
            .map_err(Self::map_error)?;
        if existing.is_approved && existing.is_active {
            debug!("Already approved");
            return Ok(existing);
        }
        info!("Approving restaurant");
        self.inner
            .perform_action(id, RestaurantAction::Approve)
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn set_active(
        &self,
        id: RestaurantId,
        active: bool,
    ) -> Result<Restaurant, RestaurantError> {
        debug!("Sending request");
        self.inner
            .perform_action(id, RestaurantAction::SetActive(active))
            .await
            .map_err(Self::map_error)
    }

    /// Adds one review's stars to the restaurant's rating.
    #[instrument(skip(self))]
    pub async fn add_rating(&self, id: RestaurantId, stars: u8) -> Result<Restaurant, RestaurantError> {
        debug!("Sending request");
        self.inner
            .perform_action(id, RestaurantAction::AddRating(stars))
            .await
            .map_err(Self::map_error)
    }
}

#[async_trait]
impl ActorClient<Restaurant> for RestaurantClient {
    type Error = RestaurantError;

    fn inner(&self) -> &ResourceClient<Restaurant> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e.into_entity_error::<RestaurantError>() {
            Ok(e) => e,
            Err(FrameworkError::NotFound(id)) => RestaurantError::NotFound(id),
            Err(other) => RestaurantError::ActorCommunicationError(other.to_string()),
        }
    }
}
