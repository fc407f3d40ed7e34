// src/user.rs

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Token lifetime assumed when the provider omits or garbles `expiresIn`.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// The signed-in user, as held by [`Session`](crate::session::Session).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SessionUser {
    #[serde(rename = "localId")]
    pub local_id: String,
    pub email: String,
    #[serde(rename = "emailVerified", default)]
    pub email_verified: bool,
    #[serde(rename = "idToken")]
    pub id_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    #[serde(rename = "expiresAt")]
    pub expires_at: DateTime<Utc>,
}

impl SessionUser {
    pub(crate) fn from_auth_response(response: AuthResponse, now: DateTime<Utc>) -> Self {
        let lifetime = response
            .expires_in
            .as_deref()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
        SessionUser {
            local_id: response.local_id,
            email: response.email.unwrap_or_default(),
            email_verified: false,
            id_token: response.id_token,
            refresh_token: response.refresh_token,
            expires_at: now + Duration::seconds(lifetime),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

// Response body of signUp and signInWithPassword
#[derive(Debug, Deserialize, Clone)]
pub struct AuthResponse {
    #[serde(rename = "localId")]
    pub local_id: String,
    pub email: Option<String>,
    #[serde(rename = "idToken")]
    pub id_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    #[serde(rename = "expiresIn")]
    pub expires_in: Option<String>,
}

// Request body for signUp and signInWithPassword
#[derive(Serialize, Debug)]
pub(crate) struct PasswordCredentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
    #[serde(rename = "returnSecureToken")]
    pub return_secure_token: bool,
}

// Request body for sendOobCode
#[derive(Serialize, Debug)]
pub(crate) struct OobCodeRequest<'a> {
    #[serde(rename = "requestType")]
    pub request_type: &'a str,
    #[serde(rename = "idToken")]
    pub id_token: &'a str,
}

#[derive(Deserialize, Debug)]
pub(crate) struct OobCodeResponse {
    pub email: Option<String>,
}

// Request body for lookup
#[derive(Serialize, Debug)]
pub(crate) struct LookupRequest<'a> {
    #[serde(rename = "idToken")]
    pub id_token: &'a str,
}

#[derive(Deserialize, Debug)]
pub(crate) struct LookupResponse {
    #[serde(default)]
    pub users: Vec<AccountInfo>,
}

/// Account details returned by the provider's lookup endpoint.
#[derive(Deserialize, Debug, Clone)]
pub struct AccountInfo {
    #[serde(rename = "localId")]
    pub local_id: String,
    pub email: Option<String>,
    #[serde(rename = "emailVerified", default)]
    pub email_verified: bool,
}
