//! [`ActorEntity`] implementation for [`Product`], including stock actions.

use super::actions::{ProductAction, ProductActionResult};
use super::error::ProductError;
use crate::model::{Product, ProductCreate, ProductId, ProductUpdate, MAX_PRICE};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use rust_decimal::Decimal;

fn validate_price(price: Decimal) -> Result<Decimal, ProductError> {
    if price.is_sign_negative() || price > MAX_PRICE {
        return Err(ProductError::InvalidPrice(price));
    }
    Ok(price)
}

#[async_trait]
impl ActorEntity for Product {
    type Id = ProductId;
    type Create = ProductCreate;
    type Update = ProductUpdate;
    type Action = ProductAction;
    type ActionResult = ProductActionResult;
    type Context = ();
    type Error = ProductError;

    fn from_create_params(id: ProductId, params: ProductCreate) -> Result<Self, Self::Error> {
        if params.name.trim().is_empty() {
            return Err(ProductError::EmptyName);
        }
        Ok(Self {
            id,
            restaurant_id: params.restaurant_id,
            name: params.name,
            price: validate_price(params.price)?,
            stock: params.stock,
            is_available: params.is_available,
            preparation_time_minutes: params.preparation_time_minutes,
        })
    }

    /// # Fields Updated
    /// - `name`, `price`, `stock`, `is_available`
    async fn on_update(&mut self, update: ProductUpdate, _ctx: &()) -> Result<(), Self::Error> {
        if let Some(name) = update.name {
            if name.trim().is_empty() {
                return Err(ProductError::EmptyName);
            }
            self.name = name;
        }
        if let Some(price) = update.price {
            self.price = validate_price(price)?;
        }
        if let Some(stock) = update.stock {
            self.stock = stock;
        }
        if let Some(is_available) = update.is_available {
            self.is_available = is_available;
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: ProductAction,
        _ctx: &(),
    ) -> Result<ProductActionResult, Self::Error> {
        match action {
            ProductAction::CheckStock => Ok(ProductActionResult::CheckStock(self.stock)),
            ProductAction::ReserveStock(0) | ProductAction::ReleaseStock(0) => {
                Err(ProductError::InvalidQuantity(0))
            }
            ProductAction::ReserveStock(quantity) => {
                if self.stock < quantity {
                    return Err(ProductError::InsufficientStock {
                        requested: quantity,
                        available: self.stock,
                    });
                }
                self.stock -= quantity;
                Ok(ProductActionResult::ReserveStock(self.stock))
            }
            ProductAction::ReleaseStock(quantity) => {
                self.stock = self.stock.saturating_add(quantity);
                Ok(ProductActionResult::ReleaseStock(self.stock))
            }
        }
    }
}
