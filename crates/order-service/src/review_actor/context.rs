//! Dependencies injected into the Review actor.

use crate::clients::{ProductClient, RestaurantClient, UserClient};
use crate::clock::Clock;
use std::sync::Arc;

#[derive(Clone)]
pub struct ReviewContext {
    pub users: UserClient,
    pub products: ProductClient,
    pub restaurants: RestaurantClient,
    pub clock: Arc<dyn Clock>,
}
