//! Dependencies injected into the Order actor.

use crate::clients::{CouponClient, ProductClient, RestaurantClient, UserClient};
use crate::clock::Clock;
use crate::config::OrderConfig;
use std::sync::Arc;

#[derive(Clone)]
pub struct OrderContext {
    pub users: UserClient,
    pub products: ProductClient,
    pub restaurants: RestaurantClient,
    pub coupons: CouponClient,
    pub config: OrderConfig,
    pub clock: Arc<dyn Clock>,
}
