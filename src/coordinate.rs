// src/coordinate.rs

use serde::{Deserialize, Serialize};

use crate::error::MapError;

/// Latitude span used whenever the map camera is moved.
pub const LATITUDE_DELTA: f64 = 0.0922;
/// Longitude span used whenever the map camera is moved.
pub const LONGITUDE_DELTA: f64 = 0.0421;

/// A geographical point in decimal degrees.
///
/// Fields are private so that every `Coordinate` in circulation has passed
/// the range check in [`Coordinate::new`].
#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Creates a new `Coordinate`.
    ///
    /// # Errors
    /// Returns `MapError::InvalidCoordinate` if latitude is not within [-90, 90],
    /// longitude is not within [-180, 180], or either value is not finite.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, MapError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(MapError::InvalidCoordinate {
                latitude,
                longitude,
            });
        }
        Ok(Coordinate {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Center shown before any location fetch or search has succeeded.
    pub fn default_center() -> Self {
        Coordinate {
            latitude: 19.139094119217912,
            longitude: 72.84048431056259,
        }
    }
}

impl Default for Coordinate {
    fn default() -> Self {
        Coordinate::default_center()
    }
}

// Deserialization goes through the same range check as `new`.
impl<'de> Deserialize<'de> for Coordinate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            latitude: f64,
            longitude: f64,
        }

        let raw = Raw::deserialize(deserializer)?;
        Coordinate::new(raw.latitude, raw.longitude).map_err(serde::de::Error::custom)
    }
}

/// The visible area requested from the map widget.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Region {
    pub center: Coordinate,
    #[serde(rename = "latitudeDelta")]
    pub latitude_delta: f64,
    #[serde(rename = "longitudeDelta")]
    pub longitude_delta: f64,
}

impl Region {
    /// A region centered on `center` with the fixed neighborhood zoom span.
    pub fn around(center: Coordinate) -> Self {
        Region {
            center,
            latitude_delta: LATITUDE_DELTA,
            longitude_delta: LONGITUDE_DELTA,
        }
    }
}
