//! Geolocation - one-shot lookup of the user's current position

use tracing::debug;

use crate::error::LocationUnavailable;
use crate::workout::Coords;

#[allow(async_fn_in_trait)]
pub trait LocationProvider {
    /// Resolves once, with a position or the reason there is none
    async fn request(&self) -> Result<Coords, LocationUnavailable>;
}

/// Position taken from configuration (`--at` / `WAYMARK_LOCATION`)
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocation {
    coords: Option<Coords>,
}

impl FixedLocation {
    pub fn new(coords: Option<Coords>) -> Self {
        Self { coords }
    }
}

impl LocationProvider for FixedLocation {
    async fn request(&self) -> Result<Coords, LocationUnavailable> {
        debug!(coords = ?self.coords, "Location requested");
        match self.coords {
            Some(coords) if coords.is_valid() => Ok(coords),
            Some(coords) => Err(LocationUnavailable::new(format!("configured location out of range: {}", coords))),
            None => Err(LocationUnavailable::new("no location configured, pass --at lat,lng")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_location_resolves() {
        let provider = FixedLocation::new(Some(Coords::new(51.5, -0.1)));
        assert_eq!(provider.request().await, Ok(Coords::new(51.5, -0.1)));
    }

    #[tokio::test]
    async fn test_missing_location_fails() {
        let provider = FixedLocation::default();
        let err = provider.request().await.unwrap_err();
        assert!(err.reason.contains("--at"), "reason: {}", err.reason);
    }

    #[tokio::test]
    async fn test_out_of_range_location_fails() {
        let provider = FixedLocation::new(Some(Coords::new(120.0, 0.0)));
        assert!(provider.request().await.is_err());
    }
}
