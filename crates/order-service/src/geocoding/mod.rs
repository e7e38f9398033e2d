//! # Geocoding
//!
//! Forward geocoding of delivery addresses. The lookup service itself is an
//! external collaborator behind the [`Geocoder`] trait; this module provides
//! the shared [`RateLimiter`], a wrapper that applies it to any geocoder, and
//! an in-memory geocoder for tests and demos.
//!
//! When an order is placed, an address that arrives without coordinates is
//! geocoded by the order client, before the order actor sees it, if a
//! geocoder is configured. A lookup failure never fails the order.

pub mod rate_limit;

pub use rate_limit::RateLimiter;

use crate::model::{Coordinates, DeliveryAddress};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Country appended to every search so ambiguous names resolve locally.
pub const DEFAULT_COUNTRY: &str = "Nepal";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GeocodeError {
    #[error("At least one of street, area or city is required")]
    EmptyQuery,

    #[error("No location found for '{0}'")]
    NoMatch(String),

    #[error("Geocoding service error: {0}")]
    Upstream(String),
}

/// The parts of an address a geocoder searches on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddressQuery {
    pub street: Option<String>,
    pub area: Option<String>,
    pub city: Option<String>,
}

impl AddressQuery {
    pub fn is_empty(&self) -> bool {
        self.parts().next().is_none()
    }

    fn parts(&self) -> impl Iterator<Item = &str> {
        [&self.street, &self.area, &self.city]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
    }

    /// "street, area, city, country".
    pub fn search_text(&self, country: &str) -> String {
        self.parts().chain([country]).collect::<Vec<_>>().join(", ")
    }
}

impl From<&DeliveryAddress> for AddressQuery {
    fn from(address: &DeliveryAddress) -> Self {
        Self {
            street: Some(address.street.clone()),
            area: address.area.clone(),
            city: Some(address.city.clone()),
        }
    }
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn forward(&self, query: &AddressQuery) -> Result<Coordinates, GeocodeError>;
}

/// Any geocoder, throttled by a shared [`RateLimiter`].
pub struct RateLimitedGeocoder<G> {
    inner: G,
    limiter: Arc<RateLimiter>,
}

impl<G: Geocoder> RateLimitedGeocoder<G> {
    pub fn new(inner: G, limiter: Arc<RateLimiter>) -> Self {
        Self { inner, limiter }
    }
}

#[async_trait]
impl<G: Geocoder> Geocoder for RateLimitedGeocoder<G> {
    async fn forward(&self, query: &AddressQuery) -> Result<Coordinates, GeocodeError> {
        // Empty queries never reach the upstream, so they don't spend a slot.
        if query.is_empty() {
            return Err(GeocodeError::EmptyQuery);
        }
        self.limiter.acquire().await;
        self.inner.forward(query).await
    }
}

/// Resolves addresses from a fixed table keyed by area or city name.
#[derive(Debug, Default, Clone)]
pub struct StaticGeocoder {
    places: HashMap<String, Coordinates>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_place(mut self, name: &str, lat: f64, lng: f64) -> Self {
        self.places.insert(name.trim().to_lowercase(), Coordinates { lat, lng });
        self
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn forward(&self, query: &AddressQuery) -> Result<Coordinates, GeocodeError> {
        if query.is_empty() {
            return Err(GeocodeError::EmptyQuery);
        }
        // Most specific part first.
        let hit = [&query.area, &query.city]
            .into_iter()
            .flatten()
            .find_map(|name| self.places.get(&name.trim().to_lowercase()).copied());
        debug!(query = %query.search_text(DEFAULT_COUNTRY), found = hit.is_some(), "Static geocode");
        hit.ok_or_else(|| GeocodeError::NoMatch(query.search_text(DEFAULT_COUNTRY)))
    }
}
