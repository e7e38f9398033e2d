//! Error types for the Coupon actor.

use crate::model::CouponCode;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CouponError {
    #[error("Coupon not found: {0}")]
    CouponNotFound(CouponCode),

    #[error("Coupon {0} is not valid at this time")]
    CouponExpired(CouponCode),

    #[error("Coupon {code} requires a minimum order of {minimum}, subtotal is {subtotal}")]
    CouponBelowMinimum {
        code: CouponCode,
        minimum: Decimal,
        subtotal: Decimal,
    },

    #[error("Coupon {0} has reached its usage limit")]
    CouponExhausted(CouponCode),

    #[error("Coupon code already exists: {0}")]
    DuplicateCode(CouponCode),

    #[error("Invalid coupon rule: {0}")]
    InvalidRule(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
