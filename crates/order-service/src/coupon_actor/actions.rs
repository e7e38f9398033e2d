//! Custom actions for the Coupon actor.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub enum CouponAction {
    /// Computes the discount without using the coupon up.
    Evaluate { subtotal: Decimal, now: DateTime<Utc> },
    /// Computes the discount and counts one use, only if the coupon applies.
    Redeem { subtotal: Decimal, now: DateTime<Utc> },
    /// Gives back one use taken by `Redeem`.
    Release,
}

/// Results from CouponActions - variants match 1:1 with CouponAction.
#[derive(Debug, Clone, PartialEq)]
pub enum CouponActionResult {
    Evaluate(Decimal),
    Redeem { discount: Decimal, used_count: u32 },
    Release { used_count: u32 },
}
