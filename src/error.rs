// src/error.rs

use reqwest::header::InvalidHeaderValue;
use serde_json::Value;
use thiserror::Error;

use crate::report::ConditionKind;

#[derive(Error, Debug)]
pub enum MapError {
    #[error("HTTP request failed: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("URL parsing failed: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("JSON processing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("JSON deserialization failed: {0}")]
    JsonDeserializationFailed(String),

    #[error("Invalid coordinate: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("No results found for query: {0:?}")]
    NoResultsFound(String),

    #[error("Geocoding request failed (HTTP {status}): {body}")]
    GeocodingStatus { status: u16, body: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Email taken: {0}")]
    EmailTaken(String),

    #[error("Weak password: {0}")]
    WeakPassword(String),

    #[error("Too many attempts: {0}")]
    TooManyAttempts(String),

    #[error("Invalid session token: {0}")]
    InvalidSessionToken(String),

    #[error("No user is signed in")]
    SessionMissing,

    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),

    #[error("Other auth provider error (HTTP {status}): {message}")]
    OtherAuthError { status: u16, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(InvalidHeaderValue),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl MapError {
    /// Creates a `MapError` from an HTTP status code and an auth provider error body.
    ///
    /// The provider wraps failures as `{"error": {"code": 400, "message": "EMAIL_EXISTS"}}`.
    /// Some messages carry a detail suffix after a colon, e.g.
    /// `"WEAK_PASSWORD : Password should be at least 6 characters"`.
    pub(crate) fn from_response(status_code: u16, response_body: Value) -> Self {
        let raw_message = response_body
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        let (reason, detail) = match raw_message.split_once(':') {
            Some((reason, detail)) => (reason.trim().to_string(), detail.trim().to_string()),
            None => (raw_message.trim().to_string(), String::new()),
        };
        let described = if detail.is_empty() {
            reason.clone()
        } else {
            format!("{} ({})", reason, detail)
        };

        match reason.as_str() {
            "EMAIL_EXISTS" => MapError::EmailTaken(described),
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS"
            | "USER_DISABLED" => MapError::InvalidCredentials(described),
            "WEAK_PASSWORD" => MapError::WeakPassword(described),
            "INVALID_EMAIL" | "MISSING_EMAIL" | "MISSING_PASSWORD" => {
                MapError::InvalidInput(described)
            }
            "TOO_MANY_ATTEMPTS_TRY_LATER" => MapError::TooManyAttempts(described),
            "INVALID_ID_TOKEN" | "USER_NOT_FOUND" | "TOKEN_EXPIRED" => {
                MapError::InvalidSessionToken(described)
            }
            _ => {
                if status_code >= 500 {
                    MapError::InternalServerError(format!(
                        "Server error (HTTP {}): {}",
                        status_code, described
                    ))
                } else if status_code == 401 || status_code == 403 {
                    MapError::AuthenticationError(format!(
                        "Auth error (HTTP {}): {}",
                        status_code, described
                    ))
                } else {
                    MapError::OtherAuthError {
                        status: status_code,
                        message: described,
                    }
                }
            }
        }
    }

    /// Classifies this error into the condition reported to the user-facing layer.
    pub fn condition(&self) -> ConditionKind {
        match self {
            MapError::PermissionDenied => ConditionKind::PermissionDenied,
            MapError::LocationUnavailable(_) | MapError::InvalidCoordinate { .. } => {
                ConditionKind::LocationUnavailable
            }
            MapError::NoResultsFound(_) => ConditionKind::NoResultsFound,
            MapError::ReqwestError(_)
            | MapError::UrlParseError(_)
            | MapError::JsonError(_)
            | MapError::JsonDeserializationFailed(_)
            | MapError::GeocodingStatus { .. }
            | MapError::InvalidUrl(_) => ConditionKind::SearchFailed,
            MapError::InvalidInput(_)
            | MapError::InvalidCredentials(_)
            | MapError::EmailTaken(_)
            | MapError::WeakPassword(_)
            | MapError::TooManyAttempts(_)
            | MapError::InvalidSessionToken(_)
            | MapError::SessionMissing
            | MapError::AuthenticationError(_)
            | MapError::InternalServerError(_)
            | MapError::OtherAuthError { .. }
            | MapError::ConfigError(_)
            | MapError::InvalidHeaderValue(_) => ConditionKind::AuthFailed,
        }
    }
}
