//! [`ActorEntity`] implementation for [`Coupon`].

use super::actions::{CouponAction, CouponActionResult};
use super::error::CouponError;
use crate::model::{Coupon, CouponCode, CouponCreate, CouponUpdate, DiscountRule};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{info, warn};

fn validate_rule(rule: &DiscountRule) -> Result<(), CouponError> {
    match *rule {
        DiscountRule::Percentage(p) if p <= Decimal::ZERO || p > Decimal::ONE_HUNDRED => Err(
            CouponError::InvalidRule(format!("percentage must be in (0, 100], got {p}")),
        ),
        DiscountRule::Flat(amount) if amount <= Decimal::ZERO => Err(CouponError::InvalidRule(
            format!("flat discount must be positive, got {amount}"),
        )),
        _ => Ok(()),
    }
}

#[async_trait]
impl ActorEntity for Coupon {
    type Id = CouponCode;
    type Create = CouponCreate;
    type Update = CouponUpdate;
    type Action = CouponAction;
    type ActionResult = CouponActionResult;
    type Context = ();
    type Error = CouponError;

    fn from_create_params(code: CouponCode, params: CouponCreate) -> Result<Self, Self::Error> {
        if code.is_empty() {
            return Err(CouponError::InvalidRule("coupon code must not be empty".into()));
        }
        validate_rule(&params.rule)?;
        if params.min_order.is_sign_negative() {
            return Err(CouponError::InvalidRule("minimum order must not be negative".into()));
        }
        if let (Some(from), Some(until)) = (params.valid_from, params.valid_until) {
            if from > until {
                return Err(CouponError::InvalidRule("validity window ends before it starts".into()));
            }
        }
        Ok(Self {
            code,
            rule: params.rule,
            valid_from: params.valid_from,
            valid_until: params.valid_until,
            min_order: params.min_order,
            usage_cap: params.usage_cap,
            used_count: 0,
            is_active: true,
        })
    }

    async fn on_update(&mut self, update: CouponUpdate, _ctx: &()) -> Result<(), Self::Error> {
        if let Some(until) = update.valid_until {
            if self.valid_from.is_some_and(|from| from > until) {
                return Err(CouponError::InvalidRule("validity window ends before it starts".into()));
            }
            self.valid_until = Some(until);
        }
        if let Some(cap) = update.usage_cap {
            self.usage_cap = Some(cap);
        }
        if let Some(active) = update.is_active {
            self.is_active = active;
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: CouponAction,
        _ctx: &(),
    ) -> Result<CouponActionResult, Self::Error> {
        match action {
            CouponAction::Evaluate { subtotal, now } => {
                Ok(CouponActionResult::Evaluate(self.evaluate(subtotal, now)?))
            }
            CouponAction::Redeem { subtotal, now } => {
                let discount = self.evaluate(subtotal, now)?;
                self.used_count += 1;
                info!(coupon = %self.code, used = self.used_count, cap = ?self.usage_cap, "Coupon redeemed");
                Ok(CouponActionResult::Redeem {
                    discount,
                    used_count: self.used_count,
                })
            }
            CouponAction::Release => {
                if self.used_count == 0 {
                    warn!(coupon = %self.code, "Release without a matching redemption");
                } else {
                    self.used_count -= 1;
                    info!(coupon = %self.code, used = self.used_count, "Coupon use released");
                }
                Ok(CouponActionResult::Release {
                    used_count: self.used_count,
                })
            }
        }
    }
}
