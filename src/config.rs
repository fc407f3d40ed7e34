// src/config.rs

use std::env;
use std::time::Duration;

use reqwest::Url;

use crate::coordinate::Coordinate;
use crate::error::MapError;

pub const DEFAULT_GEOCODING_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_AUTH_URL: &str = "https://identitytoolkit.googleapis.com";
pub const DEFAULT_USER_AGENT: &str = concat!("mapnav/", env!("CARGO_PKG_VERSION"));

pub const ENV_AUTH_API_KEY: &str = "MAPNAV_AUTH_API_KEY";
pub const ENV_AUTH_URL: &str = "MAPNAV_AUTH_URL";

/// Normalizes a user-supplied base URL.
///
/// A missing scheme defaults to `https://`, and the result always ends with
/// a `/` so that relative joins append to the path instead of replacing its
/// last segment.
pub(crate) fn normalize_base_url(raw: &str) -> Result<Url, MapError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(MapError::ConfigError("base URL cannot be empty".to_string()));
    }

    let mut with_scheme = trimmed.to_string();
    if !with_scheme.starts_with("http://") && !with_scheme.starts_with("https://") {
        with_scheme = format!("https://{}", with_scheme);
    }
    if !with_scheme.ends_with('/') {
        with_scheme.push('/');
    }

    let parsed = Url::parse(&with_scheme)?;
    if parsed.cannot_be_a_base() {
        return Err(MapError::InvalidUrl(format!(
            "'{}' cannot be used as a base URL",
            raw
        )));
    }
    Ok(parsed)
}

/// Settings for [`NominatimGeocoder`](crate::geocoding::NominatimGeocoder).
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub user_agent: String,
    /// `None` keeps the transport's default behavior.
    pub timeout: Option<Duration>,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        GeocoderConfig {
            base_url: DEFAULT_GEOCODING_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
        }
    }
}

impl GeocoderConfig {
    pub fn new(base_url: &str) -> Self {
        GeocoderConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        }
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Settings for [`AuthClient`](crate::client::AuthClient).
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Option<Duration>,
}

impl AuthConfig {
    pub fn new(api_key: &str) -> Self {
        AuthConfig {
            api_key: api_key.to_string(),
            base_url: DEFAULT_AUTH_URL.to_string(),
            timeout: None,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Reads the provider credentials from the environment.
    ///
    /// `MAPNAV_AUTH_API_KEY` is required; `MAPNAV_AUTH_URL` overrides the
    /// default provider endpoint.
    pub fn from_env() -> Result<Self, MapError> {
        let api_key = env::var(ENV_AUTH_API_KEY)
            .map_err(|_| MapError::ConfigError(format!("{} is not set", ENV_AUTH_API_KEY)))?;
        if api_key.trim().is_empty() {
            return Err(MapError::ConfigError(format!(
                "{} is empty",
                ENV_AUTH_API_KEY
            )));
        }

        let mut config = AuthConfig::new(api_key.trim());
        if let Ok(base_url) = env::var(ENV_AUTH_URL) {
            if !base_url.trim().is_empty() {
                config.base_url = base_url;
            }
        }
        Ok(config)
    }
}

/// What happens to the search box text after a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryRetention {
    /// The text stays as typed.
    #[default]
    Keep,
    /// The text is cleared only when the map moved to a result.
    ClearOnSuccess,
    /// The text is cleared once the search completes, whatever the outcome.
    ClearAlways,
}

/// Settings for [`LocationSearchController`](crate::controller::LocationSearchController).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerOptions {
    pub initial_center: Coordinate,
    pub query_retention: QueryRetention,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        ControllerOptions {
            initial_center: Coordinate::default_center(),
            query_retention: QueryRetention::Keep,
        }
    }
}

impl ControllerOptions {
    pub fn with_initial_center(mut self, center: Coordinate) -> Self {
        self.initial_center = center;
        self
    }

    pub fn with_query_retention(mut self, retention: QueryRetention) -> Self {
        self.query_retention = retention;
        self
    }
}
