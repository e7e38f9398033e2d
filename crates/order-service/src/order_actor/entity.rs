//! [`ActorEntity`] implementation for [`Order`].
//!
//! Creation runs the [assembler](super::assembler); actions run the
//! [state machine](super::machine) and then apply the stock change it asks
//! for. Orders are never updated field by field and never deleted.

use super::actions::OrderAction;
use super::assembler;
use super::context::OrderContext;
use super::error::OrderError;
use super::machine::{self, Rules, StockChange};
use super::stock;
use crate::model::{Order, OrderCreate, OrderId};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use tracing::{debug, info};

#[async_trait]
impl ActorEntity for Order {
    type Id = OrderId;
    type Create = OrderCreate;
    type Update = ();
    type Action = OrderAction;
    type ActionResult = Order;
    type Context = OrderContext;
    type Error = OrderError;

    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, Self::Error> {
        assembler::draft(id, params)
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    /// Prices the cart, checks references and redeems the coupon.
    async fn on_create(&mut self, ctx: &OrderContext) -> Result<(), Self::Error> {
        assembler::assemble(self, ctx).await
    }

    async fn on_update(&mut self, _update: (), _ctx: &OrderContext) -> Result<(), Self::Error> {
        Err(OrderError::UpdateForbidden)
    }

    /// Orders are kept for history and income reports.
    async fn on_delete(&self, _ctx: &OrderContext) -> Result<(), Self::Error> {
        Err(OrderError::DeletionForbidden)
    }

    /// Returns the order as it is after the action.
    ///
    /// `revision` and `updated_at` only move when something changed, so a
    /// repeated transition leaves the order byte-for-byte the same.
    async fn handle_action(
        &mut self,
        action: OrderAction,
        ctx: &OrderContext,
    ) -> Result<Order, Self::Error> {
        let name = action.name();
        let now = ctx.clock.now();
        let outcome = machine::apply(self, action, &Rules::from(&ctx.config), now)?;

        match outcome.stock {
            StockChange::Keep => {}
            StockChange::Reserve => {
                stock::reserve_items(&ctx.products, &self.items).await?;
                self.stock_reserved = true;
            }
            StockChange::Release => {
                stock::release_items(&ctx.products, &self.items).await;
                self.stock_reserved = false;
            }
        }

        if outcome.changed {
            self.revision += 1;
            self.updated_at = now;
            info!(
                order_id = %self.id,
                action = name,
                status = %self.status,
                restaurant_status = %self.restaurant_status,
                payment_status = %self.payment_status,
                revision = self.revision,
                "Order transition applied"
            );
        } else {
            debug!(order_id = %self.id, action = name, "Transition already applied");
        }
        Ok(self.clone())
    }
}
