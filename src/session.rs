// src/session.rs

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use crate::client::AuthClient;
use crate::error::MapError;
use crate::user::SessionUser;

/// The application's authenticated session.
///
/// One `Session` is created at startup, wrapped in an `Arc` and handed to every
/// screen that needs it. Screens never build their own. It pairs an
/// [`AuthClient`] with the currently signed-in user, if any.
#[derive(Debug)]
pub struct Session {
    client: AuthClient,
    user: RwLock<Option<SessionUser>>,
}

impl Session {
    pub fn new(client: AuthClient) -> Self {
        Session {
            client,
            user: RwLock::new(None),
        }
    }

    pub fn client(&self) -> &AuthClient {
        &self.client
    }

    fn read_user(&self) -> RwLockReadGuard<'_, Option<SessionUser>> {
        self.user.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_user(&self) -> RwLockWriteGuard<'_, Option<SessionUser>> {
        self.user.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates an account and signs it in.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SessionUser, MapError> {
        let response = self.client.sign_up(email, password).await?;
        let user = SessionUser::from_auth_response(response, Utc::now());
        log::info!("Signed up {}", user.email);
        *self.write_user() = Some(user.clone());
        Ok(user)
    }

    /// Signs in with email and password, replacing any current user.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SessionUser, MapError> {
        let response = self.client.sign_in_with_password(email, password).await?;
        let user = SessionUser::from_auth_response(response, Utc::now());
        log::info!("Signed in {}", user.email);
        *self.write_user() = Some(user.clone());
        Ok(user)
    }

    /// Forgets the current user. Returns who was signed in, if anyone.
    ///
    /// Tokens are bearer credentials with a fixed lifetime, so signing out is
    /// purely local and cannot fail.
    pub fn sign_out(&self) -> Option<SessionUser> {
        let previous = self.write_user().take();
        match &previous {
            Some(user) => log::info!("Signed out {}", user.email),
            None => log::debug!("Sign out requested with no user signed in"),
        }
        previous
    }

    /// Mails a verification link to the signed-in user.
    pub async fn send_verification_email(&self) -> Result<(), MapError> {
        let id_token = self
            .read_user()
            .as_ref()
            .map(|user| user.id_token.clone())
            .ok_or(MapError::SessionMissing)?;
        self.client.send_email_verification(&id_token).await
    }

    /// Refreshes the signed-in user's email and verification state from the provider.
    pub async fn reload_user(&self) -> Result<SessionUser, MapError> {
        let id_token = self
            .read_user()
            .as_ref()
            .map(|user| user.id_token.clone())
            .ok_or(MapError::SessionMissing)?;
        let account = self.client.lookup(&id_token).await?;

        let mut guard = self.write_user();
        // Someone else may have signed in or out while the lookup was in flight.
        match guard.as_mut() {
            Some(user) if user.id_token == id_token => {
                if let Some(email) = account.email {
                    user.email = email;
                }
                user.email_verified = account.email_verified;
                Ok(user.clone())
            }
            _ => Err(MapError::SessionMissing),
        }
    }

    pub fn current_user(&self) -> Option<SessionUser> {
        self.read_user().clone()
    }

    pub fn current_user_email(&self) -> Option<String> {
        self.read_user().as_ref().map(|user| user.email.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read_user().is_some()
    }
}
