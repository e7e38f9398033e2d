//! Runtime configuration, read from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `DELIVERY_FLAT_FEE` | `50` |
//! | `FREE_DELIVERY_THRESHOLD` | unset (never free) |
//! | `STOCK_POLICY` | `none` (`none`, `on_accept`) |
//! | `PREPAID_FAILURE_POLICY` | `hold` (`hold`, `cancel`) |
//! | `ACTOR_BUFFER_SIZE` | `32` |
//! | `GEOCODE_MIN_INTERVAL_MS` | `1000` |
//! | `CURRENCY_LABEL` | `NPR` |
//!
//! Unparsable values, and negative money amounts, fall back to the default
//! and are logged.

use crate::model::DeliveryPolicy;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

/// When catalog stock is taken for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StockPolicy {
    /// Orders never touch stock.
    #[default]
    None,
    /// Accepting an order reserves its items; cancelling gives them back.
    OnAccept,
}

impl FromStr for StockPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(StockPolicy::None),
            "on_accept" => Ok(StockPolicy::OnAccept),
            _ => Err(ConfigError::InvalidValue {
                key: "STOCK_POLICY",
                value: s.to_string(),
            }),
        }
    }
}

/// What a failed esewa/khalti payment does to the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrepaidFailurePolicy {
    /// The order stays at `pending` until a later payment completes.
    #[default]
    Hold,
    /// The order is cancelled if it still can be.
    Cancel,
}

impl FromStr for PrepaidFailurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hold" => Ok(PrepaidFailurePolicy::Hold),
            "cancel" => Ok(PrepaidFailurePolicy::Cancel),
            _ => Err(ConfigError::InvalidValue {
                key: "PREPAID_FAILURE_POLICY",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderConfig {
    pub delivery: DeliveryPolicy,
    pub stock_policy: StockPolicy,
    pub prepaid_failure_policy: PrepaidFailurePolicy,
    pub actor_buffer_size: usize,
    pub geocode_min_interval: Duration,
    pub currency_label: String,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            delivery: DeliveryPolicy::default(),
            stock_policy: StockPolicy::default(),
            prepaid_failure_policy: PrepaidFailurePolicy::default(),
            actor_buffer_size: 32,
            geocode_min_interval: Duration::from_millis(1000),
            currency_label: "NPR".to_string(),
        }
    }
}

/// Parses `key` if set, otherwise keeps `default`.
fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "Invalid configuration value, using default");
            default
        }),
    }
}

impl OrderConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let free_above = lookup("FREE_DELIVERY_THRESHOLD").and_then(|raw| {
            Decimal::from_str(raw.trim())
                .ok()
                .filter(|threshold| !threshold.is_sign_negative())
                .or_else(|| {
                    warn!(key = "FREE_DELIVERY_THRESHOLD", value = %raw, "Invalid configuration value, ignoring");
                    None
                })
        });
        let flat_fee = parse_or(&lookup, "DELIVERY_FLAT_FEE", defaults.delivery.flat_fee);
        let flat_fee = if flat_fee.is_sign_negative() {
            warn!(key = "DELIVERY_FLAT_FEE", value = %flat_fee, "Negative delivery fee, using default");
            defaults.delivery.flat_fee
        } else {
            flat_fee
        };

        Self {
            delivery: DeliveryPolicy {
                flat_fee,
                free_above,
            },
            stock_policy: parse_or(&lookup, "STOCK_POLICY", defaults.stock_policy),
            prepaid_failure_policy: parse_or(
                &lookup,
                "PREPAID_FAILURE_POLICY",
                defaults.prepaid_failure_policy,
            ),
            actor_buffer_size: parse_or(&lookup, "ACTOR_BUFFER_SIZE", defaults.actor_buffer_size).max(1),
            geocode_min_interval: Duration::from_millis(parse_or(
                &lookup,
                "GEOCODE_MIN_INTERVAL_MS",
                1000u64,
            )),
            currency_label: lookup("CURRENCY_LABEL")
                .map(|label| label.trim().to_string())
                .filter(|label| !label.is_empty())
                .unwrap_or(defaults.currency_label),
        }
    }

    pub fn with_stock_policy(mut self, policy: StockPolicy) -> Self {
        self.stock_policy = policy;
        self
    }

    pub fn with_prepaid_failure_policy(mut self, policy: PrepaidFailurePolicy) -> Self {
        self.prepaid_failure_policy = policy;
        self
    }

    pub fn with_delivery(mut self, delivery: DeliveryPolicy) -> Self {
        self.delivery = delivery;
        self
    }
}
