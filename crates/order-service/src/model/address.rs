use serde::{Deserialize, Serialize};

/// WGS84 latitude/longitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Delivery address as copied into an order.
///
/// Orders keep their own copy, so editing a saved address later never
/// changes where a past order was delivered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAddress {
    #[serde(default)]
    pub label: Option<String>,
    pub street: String,
    #[serde(default)]
    pub area: Option<String>,
    pub city: String,
    #[serde(default)]
    pub landmark: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

impl DeliveryAddress {
    pub fn new(street: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            street: street.into(),
            city: city.into(),
            ..Self::default()
        }
    }

    pub fn with_area(mut self, area: impl Into<String>) -> Self {
        self.area = Some(area.into());
        self
    }

    pub fn with_coordinates(mut self, lat: f64, lng: f64) -> Self {
        self.coordinates = Some(Coordinates { lat, lng });
        self
    }

    /// "street, area, city" with empty parts skipped.
    pub fn one_line(&self) -> String {
        [Some(self.street.as_str()), self.area.as_deref(), Some(self.city.as_str())]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
