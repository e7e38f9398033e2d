//! # Order Client
//!
//! Placing an order and driving it through its lifecycle. Every transition
//! returns the order as it is afterwards.
//!
//! A missing delivery location is geocoded here, before the order reaches
//! the actor. Geocoding is best effort and never fails an order.
//!
//! The `*_if_revision` variants only apply when the stored order is still at
//! the revision the caller read, and fail with [`OrderError::Conflict`]
//! otherwise.

use crate::geocoding::{AddressQuery, Geocoder};
use crate::model::{
    DeliveryAddress, Initiator, Order, OrderCreate, OrderId, PaymentMethod, PaymentOutcome, RestaurantId, UserId,
};
use crate::order_actor::{OrderAction, OrderError};
use crate::reports::{self, YearMonth};
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    geocoder: Option<Arc<dyn Geocoder>>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self {
            inner,
            geocoder: None,
        }
    }

    /// Geocodes delivery addresses that arrive without coordinates.
    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    /// Validates, prices and stores an order. Nothing is stored on error.
    #[instrument(skip(self, params), fields(user_id = %params.user_id, restaurant_id = %params.restaurant_id))]
    pub async fn place_order(&self, mut params: OrderCreate) -> Result<OrderId, OrderError> {
        self.locate(&mut params.delivery_address).await;
        debug!(lines = params.items.len(), "Sending request");
        let id = self.inner.create(params).await.map_err(Self::map_error)?;
        info!(order_id = %id, "Order placed");
        Ok(id)
    }

    /// Fetches an order, failing with `OrderNotFound` when there is none.
    pub async fn get_order(&self, id: OrderId) -> Result<Order, OrderError> {
        self.get(id)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn transition(&self, id: OrderId, action: OrderAction) -> Result<Order, OrderError> {
        debug!(?action, "Sending request");
        self.inner
            .perform_action(id, action)
            .await
            .map_err(Self::map_error)
    }

    /// Applies `action` only if the order is still at `expected_revision`.
    #[instrument(skip(self))]
    pub async fn transition_if_revision(
        &self,
        id: OrderId,
        expected_revision: u64,
        action: OrderAction,
    ) -> Result<Order, OrderError> {
        debug!(?action, "Sending request");
        self.inner
            .perform_action_if(id, expected_revision, action)
            .await
            .map_err(Self::map_error)
    }

    pub async fn accept_order(&self, id: OrderId, preparation_minutes: u32) -> Result<Order, OrderError> {
        self.transition(id, OrderAction::Accept { preparation_minutes })
            .await
    }

    pub async fn accept_order_if_revision(
        &self,
        id: OrderId,
        expected_revision: u64,
        preparation_minutes: u32,
    ) -> Result<Order, OrderError> {
        self.transition_if_revision(id, expected_revision, OrderAction::Accept { preparation_minutes })
            .await
    }

    pub async fn reject_order(&self, id: OrderId, reason: impl Into<String>) -> Result<Order, OrderError> {
        self.transition(id, OrderAction::Reject { reason: reason.into() })
            .await
    }

    pub async fn reject_order_if_revision(
        &self,
        id: OrderId,
        expected_revision: u64,
        reason: impl Into<String>,
    ) -> Result<Order, OrderError> {
        self.transition_if_revision(id, expected_revision, OrderAction::Reject { reason: reason.into() })
            .await
    }

    /// One kitchen step: `accepted → preparing → ready`.
    pub async fn advance_kitchen(&self, id: OrderId) -> Result<Order, OrderError> {
        self.transition(id, OrderAction::AdvanceKitchen).await
    }

    pub async fn dispatch_order(&self, id: OrderId) -> Result<Order, OrderError> {
        self.transition(id, OrderAction::Dispatch).await
    }

    pub async fn confirm_delivery(&self, id: OrderId) -> Result<Order, OrderError> {
        self.transition(id, OrderAction::ConfirmDelivery).await
    }

    pub async fn cancel_order(
        &self,
        id: OrderId,
        by: Initiator,
        reason: Option<String>,
    ) -> Result<Order, OrderError> {
        self.transition(id, OrderAction::Cancel { by, reason }).await
    }

    pub async fn cancel_order_if_revision(
        &self,
        id: OrderId,
        expected_revision: u64,
        by: Initiator,
        reason: Option<String>,
    ) -> Result<Order, OrderError> {
        self.transition_if_revision(id, expected_revision, OrderAction::Cancel { by, reason })
            .await
    }

    /// Records what the gateway (or the rider, for cash) reported.
    pub async fn record_payment(
        &self,
        id: OrderId,
        method: PaymentMethod,
        transaction_id: Option<String>,
        outcome: PaymentOutcome,
    ) -> Result<Order, OrderError> {
        self.transition(
            id,
            OrderAction::RecordPayment {
                method,
                transaction_id,
                outcome,
            },
        )
        .await
    }

    /// A customer's orders, oldest first.
    pub async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, OrderError> {
        self.matching(|order| order.user_id == user_id).await
    }

    /// A restaurant's orders, oldest first.
    pub async fn orders_for_restaurant(
        &self,
        restaurant_id: RestaurantId,
    ) -> Result<Vec<Order>, OrderError> {
        self.matching(|order| order.restaurant_id == restaurant_id).await
    }

    /// Income of one restaurant per month, cancelled orders excluded.
    pub async fn income_by_month(
        &self,
        restaurant_id: RestaurantId,
    ) -> Result<BTreeMap<YearMonth, Decimal>, OrderError> {
        let orders = self.orders_for_restaurant(restaurant_id).await?;
        Ok(reports::income_by_month(&orders))
    }

    /// Income of the whole platform per month, cancelled orders excluded.
    pub async fn platform_income_by_month(&self) -> Result<BTreeMap<YearMonth, Decimal>, OrderError> {
        let orders = self.list().await?;
        Ok(reports::income_by_month(&orders))
    }

    /// Fills in coordinates when the address has none.
    async fn locate(&self, address: &mut DeliveryAddress) {
        if address.coordinates.is_some() {
            return;
        }
        let Some(geocoder) = &self.geocoder else {
            return;
        };
        match geocoder.forward(&AddressQuery::from(&*address)).await {
            Ok(found) => {
                debug!(lat = found.lat, lng = found.lng, "Delivery address geocoded");
                address.coordinates = Some(found);
            }
            Err(e) => warn!(error = %e, address = %address.one_line(), "Geocoding failed, keeping address without coordinates"),
        }
    }

    async fn matching(&self, keep: impl Fn(&Order) -> bool) -> Result<Vec<Order>, OrderError> {
        let mut orders: Vec<Order> = self.list().await?.into_iter().filter(|o| keep(o)).collect();
        orders.sort_by_key(|order| (order.created_at, order.id));
        Ok(orders)
    }
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e.into_entity_error::<OrderError>() {
            Ok(e) => e,
            Err(FrameworkError::NotFound(id)) => OrderError::OrderNotFound(id),
            Err(FrameworkError::Conflict { expected, actual }) => {
                OrderError::Conflict { expected, actual }
            }
            Err(e) if e.is_unreachable() => OrderError::dependency(e),
            Err(other) => OrderError::internal(other.to_string()),
        }
    }
}
