// src/client.rs

use crate::config::{normalize_base_url, AuthConfig};
use crate::error::MapError;
use crate::user::{
    AccountInfo, AuthResponse, LookupRequest, LookupResponse, OobCodeRequest, OobCodeResponse,
    PasswordCredentials,
};

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Header carrying the provider API key. Sending it as a header keeps it out of logged URLs.
const API_KEY_HEADER: &str = "X-Goog-Api-Key";

/// HTTP client for the email/password authentication provider.
///
/// `AuthClient` speaks the provider's REST API: every call is a JSON `POST` to
/// `{base_url}/v1/accounts:<action>`. It holds no user state; the signed-in
/// user lives in [`Session`](crate::session::Session), which wraps a client.
///
/// # Initialization
///
/// ```rust,no_run
/// use mapnav::{AuthClient, AuthConfig, MapError};
///
/// # fn main() -> Result<(), MapError> {
/// let client = AuthClient::new(AuthConfig::from_env()?)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AuthClient {
    pub(crate) base_url: Url,
    pub(crate) http_client: Client,
}

impl AuthClient {
    /// Creates a new `AuthClient`.
    ///
    /// The base URL is normalized (scheme defaulted to `https://`, trailing slash
    /// added) and the API key is installed as a default, sensitive header.
    ///
    /// # Errors
    ///
    /// Returns a `MapError` if the API key is empty, the base URL is invalid, or
    /// the key cannot be used as a header value.
    pub fn new(config: AuthConfig) -> Result<Self, MapError> {
        if config.api_key.trim().is_empty() {
            return Err(MapError::ConfigError("API key cannot be empty".to_string()));
        }
        let base_url = normalize_base_url(&config.base_url)?;

        let mut api_key =
            HeaderValue::from_str(config.api_key.trim()).map_err(MapError::InvalidHeaderValue)?;
        api_key.set_sensitive(true);

        let mut default_headers = HeaderMap::new();
        default_headers.insert(API_KEY_HEADER, api_key);
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder().default_headers(default_headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().map_err(MapError::ReqwestError)?;

        log::debug!("AuthClient initialized with base url: {}", base_url);

        Ok(Self {
            base_url,
            http_client,
        })
    }

    /// Creates an account and returns the provider's token bundle.
    ///
    /// The provider signs the new account in immediately, so the response
    /// carries an ID token just like [`AuthClient::sign_in_with_password`].
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthResponse, MapError> {
        let body = PasswordCredentials {
            email,
            password,
            return_secure_token: true,
        };
        self._request("signUp", &body).await
    }

    /// Exchanges email and password for a token bundle.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, MapError> {
        let body = PasswordCredentials {
            email,
            password,
            return_secure_token: true,
        };
        self._request("signInWithPassword", &body).await
    }

    /// Asks the provider to mail a verification link to the account behind `id_token`.
    pub async fn send_email_verification(&self, id_token: &str) -> Result<(), MapError> {
        let body = OobCodeRequest {
            request_type: "VERIFY_EMAIL",
            id_token,
        };
        let response: OobCodeResponse = self._request("sendOobCode", &body).await?;
        log::debug!(
            "Verification email queued for {}",
            response.email.as_deref().unwrap_or("<unknown>")
        );
        Ok(())
    }

    /// Fetches the account behind `id_token`, including its verification state.
    pub async fn lookup(&self, id_token: &str) -> Result<AccountInfo, MapError> {
        let response: LookupResponse = self._request("lookup", &LookupRequest { id_token }).await?;
        response.users.into_iter().next().ok_or_else(|| {
            MapError::InvalidSessionToken("lookup returned no account for this token".to_string())
        })
    }

    pub(crate) fn endpoint(&self, action: &str) -> Result<Url, MapError> {
        let path = format!("v1/accounts:{}", action);
        self.base_url.join(&path).map_err(|e| {
            MapError::InvalidUrl(format!(
                "Failed to join base URL '{}' with API path '{}': {}",
                self.base_url, path, e
            ))
        })
    }

    // Central request method
    pub(crate) async fn _request<T: Serialize + Sync, R: DeserializeOwned>(
        &self,
        action: &str,
        body: &T,
    ) -> Result<R, MapError> {
        let url = self.endpoint(action)?;
        let body_str = serde_json::to_string(body).map_err(MapError::JsonError)?;

        // Bodies carry passwords and tokens; only the action and URL are logged.
        log::debug!("Preparing request: Method=POST, URL={}", url);

        let response = self
            .http_client
            .post(url)
            .body(body_str)
            .send()
            .await
            .map_err(MapError::ReqwestError)?;

        let status = response.status();
        let body_bytes = response.bytes().await.map_err(MapError::ReqwestError)?;

        if status.is_success() {
            log::debug!("Request '{}' succeeded with status {}", action, status);
            serde_json::from_slice(&body_bytes).map_err(|e| {
                log::error!(
                    "JSON deserialization failed for successful '{}' response: {}",
                    action,
                    e
                );
                MapError::JsonDeserializationFailed(format!(
                    "Failed to deserialize successful '{}' response: {}",
                    action, e
                ))
            })
        } else {
            let error_body_str = String::from_utf8_lossy(&body_bytes).to_string();
            log::warn!(
                "Request '{}' failed with status {}. Response body: {}",
                action,
                status,
                error_body_str
            );
            match serde_json::from_slice::<Value>(&body_bytes) {
                Ok(json_value) => Err(MapError::from_response(status.as_u16(), json_value)),
                Err(_) => {
                    let fallback_json = serde_json::json!({
                        "error": { "code": status.as_u16(), "message": error_body_str }
                    });
                    Err(MapError::from_response(status.as_u16(), fallback_json))
                }
            }
        }
    }
}
