//! Error types for the Order actor, and their classification.

use crate::coupon_actor::CouponError;
use crate::model::{OrderStatus, ProductId, RestaurantId, UserId};
use thiserror::Error;

/// How a caller should react to an [`OrderError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input. Retrying the same request fails again.
    Validation,
    /// A referenced order, product, user or coupon does not exist.
    NotFound,
    /// The order is not in a state that allows the transition. Re-read it first.
    InvalidTransition,
    /// Lost a compare-and-swap. Retry with the fresh revision.
    Conflict,
    /// Another actor or upstream service did not answer. Retry with backoff.
    ExternalDependency,
    Internal,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Invalid quantity {quantity} for {product_id}")]
    InvalidQuantity { product_id: ProductId, quantity: i64 },

    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("Product unavailable: {0}")]
    ProductUnavailable(ProductId),

    #[error("{product_id} is not sold by {restaurant_id}")]
    CrossRestaurantCart {
        product_id: ProductId,
        restaurant_id: RestaurantId,
    },

    #[error("Restaurant is not taking orders: {0}")]
    RestaurantUnavailable(RestaurantId),

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error(transparent)]
    Coupon(#[from] CouponError),

    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Cannot {action} an order that is {state}")]
    InvalidTransition { action: &'static str, state: String },

    #[error("Order cannot be cancelled while {0}")]
    NotCancellable(OrderStatus),

    #[error("{user_id} does not own this order")]
    NotOrderOwner { user_id: UserId },

    #[error("Orders cannot be deleted")]
    DeletionForbidden,

    #[error("Orders only change through transitions")]
    UpdateForbidden,

    #[error("Order changed concurrently: expected revision {expected}, found {actual}")]
    Conflict { expected: u64, actual: u64 },

    #[error("Dependency unavailable: {0}")]
    ExternalDependency(String),

    #[error("Invalid order request: {0}")]
    Validation(String),

    /// The detail is for logs only and is not part of the message.
    #[error("internal error")]
    Internal { detail: String },
}

impl OrderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrderError::EmptyCart
            | OrderError::InvalidQuantity { .. }
            | OrderError::ProductUnavailable(_)
            | OrderError::CrossRestaurantCart { .. }
            | OrderError::RestaurantUnavailable(_)
            | OrderError::InsufficientStock { .. }
            | OrderError::NotOrderOwner { .. }
            | OrderError::DeletionForbidden
            | OrderError::UpdateForbidden
            | OrderError::Validation(_) => ErrorKind::Validation,
            OrderError::ProductNotFound(_)
            | OrderError::UserNotFound(_)
            | OrderError::OrderNotFound(_) => ErrorKind::NotFound,
            OrderError::Coupon(e) => match e {
                CouponError::CouponNotFound(_) => ErrorKind::NotFound,
                CouponError::ActorCommunicationError(_) => ErrorKind::ExternalDependency,
                _ => ErrorKind::Validation,
            },
            OrderError::InvalidTransition { .. } | OrderError::NotCancellable(_) => {
                ErrorKind::InvalidTransition
            }
            OrderError::Conflict { .. } => ErrorKind::Conflict,
            OrderError::ExternalDependency(_) => ErrorKind::ExternalDependency,
            OrderError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Worth retrying without changing the request.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Conflict | ErrorKind::ExternalDependency)
    }

    pub(crate) fn internal(detail: impl Into<String>) -> Self {
        OrderError::Internal {
            detail: detail.into(),
        }
    }

    pub(crate) fn dependency(source: impl std::fmt::Display) -> Self {
        OrderError::ExternalDependency(source.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CouponCode;

    #[test]
    fn coupon_errors_are_classified_by_cause() {
        let missing = OrderError::from(CouponError::CouponNotFound(CouponCode::new("NOPE")));
        assert_eq!(missing.kind(), ErrorKind::NotFound);

        let exhausted = OrderError::from(CouponError::CouponExhausted(CouponCode::new("ONCE")));
        assert_eq!(exhausted.kind(), ErrorKind::Validation);
        assert!(!exhausted.is_retryable());

        let down = OrderError::from(CouponError::ActorCommunicationError("closed".into()));
        assert!(down.is_retryable());
    }

    #[test]
    fn internal_errors_hide_their_detail() {
        let err = OrderError::internal("stored total 300 differs from 275");
        assert_eq!(err.to_string(), "internal error");
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn only_conflicts_and_dependencies_are_retryable() {
        assert!(OrderError::Conflict { expected: 1, actual: 2 }.is_retryable());
        assert!(OrderError::dependency("catalog closed").is_retryable());
        assert!(!OrderError::NotCancellable(OrderStatus::Delivering).is_retryable());
        assert!(!OrderError::EmptyCart.is_retryable());
    }
}
