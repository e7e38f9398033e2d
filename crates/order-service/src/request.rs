//! # Place-Order Request
//!
//! The JSON body a caller sends to place an order, and its validation into
//! an [`OrderCreate`]. Prices are deliberately absent: the order actor looks
//! them up.
//!
//! ```json
//! {
//!   "userId": 1,
//!   "restaurantId": 2,
//!   "items": [{ "productId": 5, "qty": 2 }],
//!   "deliveryAddress": { "street": "Durbar Marg", "city": "Kathmandu" },
//!   "couponCode": "10percent",
//!   "paymentMethod": "esewa"
//! }
//! ```

use crate::model::{
    CartItem, CouponCode, DeliveryAddress, OrderCreate, PaymentMethod, ProductId, RestaurantId,
    UserId, MAX_QUANTITY,
};
use crate::order_actor::OrderError;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineRequest {
    pub product_id: u32,
    /// Clients send numbers, numeric strings or whole floats.
    pub qty: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub user_id: u32,
    pub restaurant_id: u32,
    #[serde(default)]
    pub items: Vec<CartLineRequest>,
    pub delivery_address: DeliveryAddress,
    #[serde(default)]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

impl PlaceOrderRequest {
    pub fn from_json(body: &str) -> Result<Self, OrderError> {
        serde_json::from_str(body).map_err(|e| OrderError::Validation(e.to_string()))
    }

    /// Checks the request and turns it into creation parameters.
    ///
    /// The payment method defaults to cash; a blank coupon code counts as none.
    pub fn validate(self) -> Result<OrderCreate, OrderError> {
        if self.items.is_empty() {
            return Err(OrderError::EmptyCart);
        }
        let items = self
            .items
            .iter()
            .map(CartLineRequest::to_cart_item)
            .collect::<Result<Vec<_>, _>>()?;

        if self.delivery_address.street.trim().is_empty() || self.delivery_address.city.trim().is_empty() {
            return Err(OrderError::Validation(
                "delivery address needs a street and a city".into(),
            ));
        }

        let payment_method = match self.payment_method.as_deref().map(str::trim) {
            None | Some("") => PaymentMethod::Cash,
            Some(raw) => raw.parse().map_err(OrderError::Validation)?,
        };
        let coupon_code = self
            .coupon_code
            .as_deref()
            .map(CouponCode::new)
            .filter(|code| !code.is_empty());

        Ok(OrderCreate {
            user_id: UserId(self.user_id),
            restaurant_id: RestaurantId(self.restaurant_id),
            items,
            delivery_address: self.delivery_address,
            coupon_code,
            payment_method,
        })
    }
}

impl CartLineRequest {
    fn to_cart_item(&self) -> Result<CartItem, OrderError> {
        let product_id = ProductId(self.product_id);
        let quantity = parse_quantity(&self.qty).ok_or_else(|| {
            OrderError::Validation(format!("quantity of {product_id} is not a whole number: {}", self.qty))
        })?;
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| (1..=MAX_QUANTITY).contains(q))
            .ok_or(OrderError::InvalidQuantity {
                product_id,
                quantity,
            })?;
        Ok(CartItem {
            product_id,
            quantity,
        })
    }
}

/// Whole number from `2`, `2.0` or `"2"`.
fn parse_quantity(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            })
        }
        _ => None,
    }
}
