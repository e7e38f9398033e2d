//! Discount coupons and the rules that decide whether one applies.

use crate::coupon_actor::CouponError;
use crate::model::money::round_money;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Coupon code, the natural key of a coupon. Codes are case-insensitive and
/// stored upper-cased, so `10percent` and `10PERCENT` are the same coupon.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CouponCode(String);

impl CouponCode {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for CouponCode {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl Display for CouponCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum DiscountRule {
    /// Percent of the subtotal, in `(0, 100]`.
    Percentage(Decimal),
    /// Fixed amount off.
    Flat(Decimal),
}

impl DiscountRule {
    /// Discount for `subtotal`, never more than the subtotal itself.
    pub fn discount_for(&self, subtotal: Decimal) -> Decimal {
        let raw = match *self {
            // Dividing by 100 is exact, and a fraction of at most one cannot overflow.
            DiscountRule::Percentage(percent) => subtotal
                .checked_mul(percent / Decimal::ONE_HUNDRED)
                .unwrap_or(subtotal),
            DiscountRule::Flat(amount) => amount,
        };
        round_money(raw.min(subtotal).max(Decimal::ZERO))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    pub code: CouponCode,
    pub rule: DiscountRule,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub min_order: Decimal,
    /// Maximum number of redemptions. `None` is unlimited.
    pub usage_cap: Option<u32>,
    pub used_count: u32,
    pub is_active: bool,
}

impl Coupon {
    /// Checks the coupon against an order and returns the discount it grants.
    ///
    /// Checks run in a fixed order: active, validity window, minimum order,
    /// usage cap. An inactive coupon is reported as not found.
    pub fn evaluate(&self, subtotal: Decimal, now: DateTime<Utc>) -> Result<Decimal, CouponError> {
        if !self.is_active {
            return Err(CouponError::CouponNotFound(self.code.clone()));
        }
        let started = self.valid_from.is_none_or(|from| now >= from);
        let not_ended = self.valid_until.is_none_or(|until| now <= until);
        if !(started && not_ended) {
            return Err(CouponError::CouponExpired(self.code.clone()));
        }
        if subtotal < self.min_order {
            return Err(CouponError::CouponBelowMinimum {
                code: self.code.clone(),
                minimum: self.min_order,
                subtotal,
            });
        }
        if self.is_exhausted() {
            return Err(CouponError::CouponExhausted(self.code.clone()));
        }
        Ok(self.rule.discount_for(subtotal))
    }

    pub fn is_exhausted(&self) -> bool {
        self.usage_cap.is_some_and(|cap| self.used_count >= cap)
    }

    pub fn remaining_uses(&self) -> Option<u32> {
        self.usage_cap.map(|cap| cap.saturating_sub(self.used_count))
    }
}

/// DTO for Coupon creation. The code is the key the coupon is inserted under.
#[derive(Debug, Clone)]
pub struct CouponCreate {
    pub rule: DiscountRule,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub min_order: Decimal,
    pub usage_cap: Option<u32>,
}

impl CouponCreate {
    /// Always valid, no minimum, unlimited uses.
    pub fn unrestricted(rule: DiscountRule) -> Self {
        Self {
            rule,
            valid_from: None,
            valid_until: None,
            min_order: Decimal::ZERO,
            usage_cap: None,
        }
    }

    pub fn with_min_order(mut self, min_order: Decimal) -> Self {
        self.min_order = min_order;
        self
    }

    pub fn with_usage_cap(mut self, cap: u32) -> Self {
        self.usage_cap = Some(cap);
        self
    }

    pub fn valid_between(mut self, from: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        self.valid_from = Some(from);
        self.valid_until = Some(until);
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CouponUpdate {
    pub valid_until: Option<DateTime<Utc>>,
    pub usage_cap: Option<u32>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ten_percent(min_order: i64) -> Coupon {
        Coupon {
            code: CouponCode::new("10percent"),
            rule: DiscountRule::Percentage(Decimal::from(10)),
            valid_from: Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()),
            valid_until: Some(Utc.with_ymd_and_hms(2026, 12, 31, 23, 59, 59).unwrap()),
            min_order: Decimal::from(min_order),
            usage_cap: Some(2),
            used_count: 0,
            is_active: true,
        }
    }

    fn mid_year() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn codes_are_case_insensitive() {
        assert_eq!(CouponCode::new(" 10percent "), CouponCode::new("10PERCENT"));
        assert_eq!(CouponCode::new("welcome").to_string(), "WELCOME");
    }

    #[test]
    fn percentage_discount_on_subtotal() {
        let discount = ten_percent(200).evaluate(Decimal::from(250), mid_year()).unwrap();
        assert_eq!(discount, Decimal::from(25));
    }

    #[test]
    fn discount_never_exceeds_subtotal() {
        let flat = DiscountRule::Flat(Decimal::from(500));
        assert_eq!(flat.discount_for(Decimal::from(120)), Decimal::from(120));

        let everything = DiscountRule::Percentage(Decimal::from(100));
        assert_eq!(everything.discount_for(Decimal::new(9999, 2)), Decimal::new(9999, 2));
    }

    #[test]
    fn percentage_discount_is_rounded() {
        let rule = DiscountRule::Percentage(Decimal::new(125, 1));
        // 12.5% of 33.33 = 4.166250
        assert_eq!(rule.discount_for(Decimal::new(3333, 2)), Decimal::new(417, 2));
    }

    #[test]
    fn below_minimum_is_rejected() {
        let err = ten_percent(300).evaluate(Decimal::from(250), mid_year()).unwrap_err();
        assert!(matches!(err, CouponError::CouponBelowMinimum { .. }));
    }

    #[test]
    fn outside_window_is_expired() {
        let coupon = ten_percent(0);
        let before = Utc.with_ymd_and_hms(2025, 12, 31, 23, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap();
        assert!(matches!(coupon.evaluate(Decimal::from(250), before), Err(CouponError::CouponExpired(_))));
        assert!(matches!(coupon.evaluate(Decimal::from(250), after), Err(CouponError::CouponExpired(_))));
    }

    #[test]
    fn cap_reached_is_exhausted() {
        let mut coupon = ten_percent(0);
        coupon.used_count = 2;
        assert_eq!(coupon.remaining_uses(), Some(0));
        assert!(matches!(
            coupon.evaluate(Decimal::from(250), mid_year()),
            Err(CouponError::CouponExhausted(_))
        ));
    }

    #[test]
    fn inactive_coupon_reads_as_missing() {
        let mut coupon = ten_percent(0);
        coupon.is_active = false;
        assert!(matches!(
            coupon.evaluate(Decimal::from(250), mid_year()),
            Err(CouponError::CouponNotFound(_))
        ));
    }
}
