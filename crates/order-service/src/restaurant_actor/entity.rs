//! [`ActorEntity`] implementation for [`Restaurant`].

use super::actions::RestaurantAction;
use super::error::RestaurantError;
use crate::model::{RatingSummary, Restaurant, RestaurantCreate, RestaurantId, RestaurantUpdate};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use tracing::{debug, info};

#[async_trait]
impl ActorEntity for Restaurant {
    type Id = RestaurantId;
    type Create = RestaurantCreate;
    type Update = RestaurantUpdate;
    type Action = RestaurantAction;
    type ActionResult = Restaurant;
    type Context = ();
    type Error = RestaurantError;

    /// New restaurants start unapproved and inactive.
    fn from_create_params(id: RestaurantId, params: RestaurantCreate) -> Result<Self, Self::Error> {
        if params.name.trim().is_empty() {
            return Err(RestaurantError::EmptyName);
        }
        Ok(Self {
            id,
            owner: params.owner,
            name: params.name,
            address: params.address,
            phone: params.phone,
            cuisine: params.cuisine,
            is_approved: false,
            is_active: false,
            rating: RatingSummary::default(),
        })
    }

    async fn on_update(&mut self, update: RestaurantUpdate, _ctx: &()) -> Result<(), Self::Error> {
        if let Some(name) = update.name {
            if name.trim().is_empty() {
                return Err(RestaurantError::EmptyName);
            }
            self.name = name;
        }
        if let Some(address) = update.address {
            self.address = address;
        }
        if let Some(phone) = update.phone {
            self.phone = Some(phone);
        }
        if let Some(cuisine) = update.cuisine {
            self.cuisine = cuisine;
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: RestaurantAction,
        _ctx: &(),
    ) -> Result<Restaurant, Self::Error> {
        match action {
            RestaurantAction::Approve => {
                if !self.is_approved {
                    info!(restaurant_id = %self.id, "Restaurant approved");
                }
                self.is_approved = true;
                self.is_active = true;
            }
            RestaurantAction::SetActive(true) if !self.is_approved => {
                return Err(RestaurantError::NotApproved(self.id.to_string()));
            }
            RestaurantAction::SetActive(active) => {
                self.is_active = active;
            }
            RestaurantAction::AddRating(stars) => {
                self.rating.add(stars);
                debug!(
                    restaurant_id = %self.id,
                    stars,
                    average = %self.rating.average(),
                    total_reviews = self.rating.total_reviews,
                    "Rating recorded"
                );
            }
        }
        Ok(self.clone())
    }
}
