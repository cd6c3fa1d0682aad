//! Geographic coordinates.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing [`Coordinates`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CoordinatesError {
    /// Latitude outside [-90, 90].
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    /// Longitude outside [-180, 180].
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
    /// A coordinate is NaN or infinite.
    #[error("coordinates must be finite numbers")]
    NotFinite,
}

/// A latitude/longitude pair in decimal degrees.
///
/// Used for both the map pin position and the stored point location.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
}

impl Coordinates {
    /// Create coordinates, validating ranges.
    ///
    /// # Errors
    ///
    /// Returns an error if either value is non-finite or out of range.
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordinatesError> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(CoordinatesError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinatesError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(CoordinatesError::LongitudeOutOfRange(lon));
        }
        Ok(Self { lat, lon })
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}
