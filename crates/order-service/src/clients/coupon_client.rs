//! # Coupon Client
//!
//! `evaluate` only computes a discount. `redeem` computes it and counts the
//! use in one actor message; `release` undoes a `redeem`.

use crate::coupon_actor::{CouponAction, CouponActionResult, CouponError};
use crate::model::{Coupon, CouponCode, CouponCreate, CouponUpdate};
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct CouponClient {
    inner: ResourceClient<Coupon>,
}

impl CouponClient {
    pub fn new(inner: ResourceClient<Coupon>) -> Self {
        Self { inner }
    }

    /// Stores a coupon under `code`. Fails with `DuplicateCode` if it exists.
    #[instrument(skip(self))]
    pub async fn create_coupon(
        &self,
        code: CouponCode,
        params: CouponCreate,
    ) -> Result<CouponCode, CouponError> {
        debug!("Sending request");
        self.inner
            .insert(code.clone(), params)
            .await
            .map_err(|e| match e {
                FrameworkError::AlreadyExists(_) => CouponError::DuplicateCode(code),
                other => Self::map_error(other),
            })
    }

    #[instrument(skip(self))]
    pub async fn update_coupon(
        &self,
        code: CouponCode,
        update: CouponUpdate,
    ) -> Result<Coupon, CouponError> {
        debug!("Sending request");
        self.inner.update(code, update).await.map_err(Self::map_error)
    }

    /// Discount `code` would grant on `subtotal` at `now`.
    #[instrument(skip(self))]
    pub async fn evaluate(
        &self,
        code: CouponCode,
        subtotal: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Decimal, CouponError> {
        match self.action(code, CouponAction::Evaluate { subtotal, now }).await? {
            CouponActionResult::Evaluate(discount) => Ok(discount),
            other => Err(unexpected(other)),
        }
    }

    /// Applies the coupon: returns the discount and counts one use.
    #[instrument(skip(self))]
    pub async fn redeem(
        &self,
        code: CouponCode,
        subtotal: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Decimal, CouponError> {
        match self.action(code, CouponAction::Redeem { subtotal, now }).await? {
            CouponActionResult::Redeem { discount, .. } => Ok(discount),
            other => Err(unexpected(other)),
        }
    }

    /// Gives back one use. Returns the remaining used count.
    #[instrument(skip(self))]
    pub async fn release(&self, code: CouponCode) -> Result<u32, CouponError> {
        match self.action(code, CouponAction::Release).await? {
            CouponActionResult::Release { used_count } => Ok(used_count),
            other => Err(unexpected(other)),
        }
    }

    async fn action(
        &self,
        code: CouponCode,
        action: CouponAction,
    ) -> Result<CouponActionResult, CouponError> {
        debug!(?action, "Sending request");
        self.inner
            .perform_action(code, action)
            .await
            .map_err(Self::map_error)
    }
}

fn unexpected(result: CouponActionResult) -> CouponError {
    CouponError::ActorCommunicationError(format!("mismatched action result: {result:?}"))
}

#[async_trait]
impl ActorClient<Coupon> for CouponClient {
    type Error = CouponError;

    fn inner(&self) -> &ResourceClient<Coupon> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e.into_entity_error::<CouponError>() {
            Ok(e) => e,
            Err(FrameworkError::NotFound(code)) => CouponError::CouponNotFound(CouponCode::new(&code)),
            Err(other) => CouponError::ActorCommunicationError(other.to_string()),
        }
    }
}
