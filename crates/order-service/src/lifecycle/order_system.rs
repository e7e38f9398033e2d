use crate::clients::{
    CouponClient, OrderClient, ProductClient, RestaurantClient, ReviewClient, UserClient,
};
use crate::clock::{Clock, SystemClock};
use crate::config::OrderConfig;
use crate::coupon_actor::CouponError;
use crate::geocoding::Geocoder;
use crate::model::{CouponCode, OrderId};
use crate::order_actor::{OrderContext, OrderError};
use crate::receipt::{self, ReceiptView};
use crate::review_actor::ReviewContext;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// The running order platform: every actor and a client for each.
///
/// # Example
///
/// ```ignore
/// let system = OrderSystem::new(OrderConfig::from_env());
///
/// let user_id = system.user_client.create_user(user).await?;
/// let order_id = system.order_client.place_order(cart).await?;
/// println!("{}", system.get_receipt(order_id).await?);
///
/// system.shutdown().await?;
/// ```
pub struct OrderSystem {
    pub user_client: UserClient,
    pub product_client: ProductClient,
    pub restaurant_client: RestaurantClient,
    pub coupon_client: CouponClient,
    pub order_client: OrderClient,
    pub review_client: ReviewClient,
    config: OrderConfig,
    clock: Arc<dyn Clock>,
    handles: Vec<JoinHandle<()>>,
}

impl OrderSystem {
    /// Starts the system on the wall clock, without geocoding.
    pub fn new(config: OrderConfig) -> Self {
        Self::with_dependencies(config, Arc::new(SystemClock), None)
    }

    /// Starts the system with an explicit clock and an optional geocoder.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn with_dependencies(
        config: OrderConfig,
        clock: Arc<dyn Clock>,
        geocoder: Option<Arc<dyn Geocoder>>,
    ) -> Self {
        let buffer = config.actor_buffer_size;

        // 1. Create actors (no dependencies yet)
        let (user_actor, users) = crate::user_actor::new(buffer);
        let (product_actor, products) = crate::product_actor::new(buffer);
        let (restaurant_actor, restaurants) = crate::restaurant_actor::new(buffer);
        let (coupon_actor, coupons) = crate::coupon_actor::new(buffer);
        let (order_actor, orders) = crate::order_actor::new(buffer);
        let (review_actor, reviews) = crate::review_actor::new(buffer);

        let user_client = UserClient::new(users);
        let product_client = ProductClient::new(products);
        let restaurant_client = RestaurantClient::new(restaurants);
        let coupon_client = CouponClient::new(coupons);
        let order_client = match geocoder {
            Some(geocoder) => OrderClient::new(orders).with_geocoder(geocoder),
            None => OrderClient::new(orders),
        };
        let review_client = ReviewClient::new(reviews);

        // 2. Start actors with injected context
        let context = OrderContext {
            users: user_client.clone(),
            products: product_client.clone(),
            restaurants: restaurant_client.clone(),
            coupons: coupon_client.clone(),
            config: config.clone(),
            clock: clock.clone(),
        };
        let review_context = ReviewContext {
            users: user_client.clone(),
            products: product_client.clone(),
            restaurants: restaurant_client.clone(),
            clock: clock.clone(),
        };
        let handles = vec![
            tokio::spawn(order_actor.run(context)),
            tokio::spawn(review_actor.run(review_context)),
            tokio::spawn(user_actor.run(())),
            tokio::spawn(product_actor.run(())),
            tokio::spawn(restaurant_actor.run(())),
            tokio::spawn(coupon_actor.run(())),
        ];

        info!(
            stock_policy = ?config.stock_policy,
            prepaid_failure_policy = ?config.prepaid_failure_policy,
            buffer,
            "Order system started"
        );

        Self {
            user_client,
            product_client,
            restaurant_client,
            coupon_client,
            order_client,
            review_client,
            config,
            clock,
            handles,
        }
    }

    pub fn config(&self) -> &OrderConfig {
        &self.config
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// The discount `code` would grant on `subtotal` right now, without using it.
    pub async fn evaluate_coupon(&self, code: &str, subtotal: Decimal) -> Result<Decimal, CouponError> {
        self.coupon_client
            .evaluate(CouponCode::new(code), subtotal, self.clock.now())
            .await
    }

    pub async fn get_receipt(&self, id: OrderId) -> Result<ReceiptView, OrderError> {
        receipt::get_receipt(
            &self.order_client,
            &self.user_client,
            id,
            &self.config.currency_label,
        )
        .await
    }

    /// Stops every actor and waits for them to finish.
    ///
    /// Returns an error if any actor task panicked.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        // Dropping the clients closes the channels; the Order and Review
        // actors go first and release their clones of the others.
        drop(self.order_client);
        drop(self.review_client);
        drop(self.user_client);
        drop(self.product_client);
        drop(self.restaurant_client);
        drop(self.coupon_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
