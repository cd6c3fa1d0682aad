//! Device location seam and the position-acquisition pipeline.
//!
//! Position acquisition is a sequential pipeline of fallible steps:
//!
//! - no city chosen yet: device geolocation, reverse geocode to a postal
//!   code, resolve the postal code to a state+city pair, back-fill the
//!   form selection and map position;
//! - city already chosen: forward-geocode the city name and skip device
//!   geolocation entirely.
//!
//! Any step failing short-circuits to manual-entry mode; the workflow
//! never treats a failed acquisition as fatal.

use thiserror::Error;

use ecoponto_core::{Coordinates, Uf};

use crate::geo::{GeoDirectory, PostalAddress};

/// Errors surfaced by the device location services.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocationError {
    /// User denied the location permission prompt.
    #[error("location permission denied")]
    PermissionDenied,

    /// Location services are disabled on the device.
    #[error("location services disabled")]
    ServiceDisabled,

    /// Any other provider failure (no fix, geocoder offline, ...).
    #[error("location unavailable: {0}")]
    Unavailable(String),
}

/// Seam over the device location stack: geolocation plus forward and
/// reverse geocoding. Implemented per platform by the embedding UI, and
/// by test doubles here.
#[allow(async_fn_in_trait)]
pub trait LocationProvider {
    /// Current device coordinates (prompts for permission if needed).
    async fn current_position(&mut self) -> Result<Coordinates, LocationError>;

    /// Reverse-geocode coordinates to a postal code.
    async fn reverse_geocode(&mut self, position: Coordinates) -> Result<String, LocationError>;

    /// Forward-geocode a city name to coordinates.
    async fn forward_geocode(&mut self, city: &str, uf: Option<Uf>)
    -> Result<Coordinates, LocationError>;
}

/// Which step of the pipeline failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PositionError {
    /// Recoverable: prompt the user toward the permission settings.
    #[error("location permission denied")]
    PermissionDenied,

    /// Recoverable: prompt the user to enable location services.
    #[error("location services disabled")]
    ServiceDisabled,

    /// Device geolocation failed after permission was granted.
    #[error("geolocation failed: {0}")]
    Geolocation(String),

    /// Could not turn coordinates into a postal code.
    #[error("reverse geocoding failed: {0}")]
    ReverseGeocode(String),

    /// Postal directory did not resolve the postal code.
    #[error("postal lookup failed: {0}")]
    PostalLookup(String),

    /// Could not turn the selected city into coordinates.
    #[error("forward geocoding failed: {0}")]
    ForwardGeocode(String),
}

/// The city context carried into an acquisition when one is already
/// selected (e.g. carried over from a prior screen).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityContext {
    pub city: String,
    pub uf: Option<Uf>,
}

/// Result of a successful acquisition.
///
/// The geolocation branch fills `uf`/`city` from the postal lookup; the
/// forward-geocode branch only produces a position.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquiredPosition {
    pub uf: Option<Uf>,
    pub city: Option<String>,
    pub position: Coordinates,
}

/// Run the position-acquisition pipeline.
///
/// # Errors
///
/// Returns `PositionError` naming the step that failed; callers fall back
/// to manual map placement.
pub async fn acquire_position<L, G>(
    location: &mut L,
    directory: &G,
    selected_city: Option<&CityContext>,
) -> Result<AcquiredPosition, PositionError>
where
    L: LocationProvider,
    G: GeoDirectory,
{
    // A chosen city wins: geocode it and never touch device geolocation.
    if let Some(context) = selected_city {
        let position = location
            .forward_geocode(&context.city, context.uf)
            .await
            .map_err(|e| PositionError::ForwardGeocode(e.to_string()))?;

        return Ok(AcquiredPosition {
            uf: None,
            city: None,
            position,
        });
    }

    let position = location.current_position().await.map_err(|e| match e {
        LocationError::PermissionDenied => PositionError::PermissionDenied,
        LocationError::ServiceDisabled => PositionError::ServiceDisabled,
        LocationError::Unavailable(reason) => PositionError::Geolocation(reason),
    })?;

    let postal_code = location
        .reverse_geocode(position)
        .await
        .map_err(|e| PositionError::ReverseGeocode(e.to_string()))?;

    let PostalAddress { uf, city } = directory
        .postal_lookup(&postal_code)
        .await
        .map_err(|e| PositionError::PostalLookup(e.to_string()))?;

    Ok(AcquiredPosition {
        uf: Some(uf),
        city: Some(city),
        position,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geo::{GeoError, UfEntry};

    /// Scripted location provider that records which calls were made.
    struct FakeLocation {
        position: Result<Coordinates, LocationError>,
        postal_code: Result<String, LocationError>,
        geocoded: Result<Coordinates, LocationError>,
        geolocation_calls: usize,
        forward_calls: usize,
    }

    impl FakeLocation {
        fn happy() -> Self {
            Self {
                position: Ok(Coordinates::new(-23.55, -46.63).unwrap()),
                postal_code: Ok("01310-100".to_owned()),
                geocoded: Ok(Coordinates::new(-22.90, -43.20).unwrap()),
                geolocation_calls: 0,
                forward_calls: 0,
            }
        }
    }

    impl LocationProvider for FakeLocation {
        async fn current_position(&mut self) -> Result<Coordinates, LocationError> {
            self.geolocation_calls += 1;
            self.position.clone()
        }

        async fn reverse_geocode(
            &mut self,
            _position: Coordinates,
        ) -> Result<String, LocationError> {
            self.postal_code.clone()
        }

        async fn forward_geocode(
            &mut self,
            _city: &str,
            _uf: Option<Uf>,
        ) -> Result<Coordinates, LocationError> {
            self.forward_calls += 1;
            self.geocoded.clone()
        }
    }

    /// Directory double answering every postal lookup with São Paulo.
    struct FakeDirectory {
        fail_postal: bool,
    }

    impl GeoDirectory for FakeDirectory {
        async fn states(&self) -> Result<Vec<UfEntry>, GeoError> {
            Ok(Vec::new())
        }

        async fn cities(&self, _uf: Uf) -> Result<Vec<String>, GeoError> {
            Ok(Vec::new())
        }

        async fn postal_lookup(&self, cep: &str) -> Result<PostalAddress, GeoError> {
            if self.fail_postal {
                return Err(GeoError::PostalCodeNotFound(cep.to_owned()));
            }
            Ok(PostalAddress {
                uf: Uf::parse("SP").unwrap(),
                city: "São Paulo".to_owned(),
            })
        }
    }

    #[tokio::test]
    async fn test_geolocation_branch_backfills_state_and_city() {
        let mut location = FakeLocation::happy();
        let directory = FakeDirectory { fail_postal: false };

        let acquired = acquire_position(&mut location, &directory, None)
            .await
            .unwrap();

        assert_eq!(location.geolocation_calls, 1);
        assert_eq!(acquired.uf.unwrap().as_str(), "SP");
        assert_eq!(acquired.city.as_deref(), Some("São Paulo"));
        assert!((acquired.position.lat - -23.55).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_selected_city_skips_device_geolocation() {
        let mut location = FakeLocation::happy();
        let directory = FakeDirectory { fail_postal: false };
        let context = CityContext {
            city: "Rio de Janeiro".to_owned(),
            uf: Some(Uf::parse("RJ").unwrap()),
        };

        let acquired = acquire_position(&mut location, &directory, Some(&context))
            .await
            .unwrap();

        // Geolocation must not be requested when a city is already chosen.
        assert_eq!(location.geolocation_calls, 0);
        assert_eq!(location.forward_calls, 1);
        assert!(acquired.uf.is_none());
        assert!((acquired.position.lat - -22.90).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_permission_denied_is_recoverable_kind() {
        let mut location = FakeLocation::happy();
        location.position = Err(LocationError::PermissionDenied);
        let directory = FakeDirectory { fail_postal: false };

        let err = acquire_position(&mut location, &directory, None)
            .await
            .unwrap_err();
        assert_eq!(err, PositionError::PermissionDenied);
    }

    #[tokio::test]
    async fn test_postal_failure_names_the_step() {
        let mut location = FakeLocation::happy();
        let directory = FakeDirectory { fail_postal: true };

        let err = acquire_position(&mut location, &directory, None)
            .await
            .unwrap_err();
        assert!(matches!(err, PositionError::PostalLookup(_)));
    }
}
