// src/screens.rs

use std::sync::Arc;
use std::time::Duration;

use crate::controller::LocationSearchController;
use crate::report::{ConditionKind, Reporter};
use crate::session::Session;

/// How long the splash screen stays up before the login screen replaces it.
pub const SPLASH_DELAY: Duration = Duration::from_secs(3);

/// Display name used on the home screen when nobody is signed in.
pub const ANONYMOUS_NAME: &str = "User";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Opening,
    Signup,
    Login,
    Home,
}

/// The platform's screen stack.
pub trait Navigator: Send + Sync {
    /// Pushes `route` on top of the current screen.
    fn navigate(&self, route: Route);
    /// Replaces the current screen with `route`.
    fn replace(&self, route: Route);
}

/// Shows the splash screen for `delay`, then replaces it with the login screen.
///
/// Dropping the returned future before it completes leaves the navigator untouched.
pub async fn run_splash(navigator: &dyn Navigator, delay: Duration) {
    tokio::time::sleep(delay).await;
    navigator.replace(Route::Login);
}

/// Email and password fields shared by the login and signup forms.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    fn clear(&mut self) {
        self.email.clear();
        self.password.clear();
    }
}

pub struct LoginScreen {
    session: Arc<Session>,
    reporter: Arc<dyn Reporter>,
    form: Credentials,
}

impl LoginScreen {
    pub fn new(session: Arc<Session>, reporter: Arc<dyn Reporter>) -> Self {
        LoginScreen {
            session,
            reporter,
            form: Credentials::default(),
        }
    }

    pub fn set_email(&mut self, email: &str) {
        self.form.email = email.to_string();
    }

    pub fn set_password(&mut self, password: &str) {
        self.form.password = password.to_string();
    }

    pub fn form(&self) -> &Credentials {
        &self.form
    }

    /// Signs in with the form's credentials.
    ///
    /// On success the form is cleared and, if the provider returned an email,
    /// the home screen is opened. Failures are reported and the form is kept.
    /// Returns whether sign-in succeeded.
    pub async fn submit(&mut self, navigator: &dyn Navigator) -> bool {
        let signed_in = self
            .session
            .sign_in(&self.form.email, &self.form.password)
            .await;
        match signed_in {
            Ok(user) => {
                self.form.clear();
                if !user.email.is_empty() {
                    navigator.navigate(Route::Home);
                }
                true
            }
            Err(e) => {
                self.reporter
                    .report(ConditionKind::AuthFailed, &format!("login failed: {}", e));
                false
            }
        }
    }

    pub fn go_to_signup(&self, navigator: &dyn Navigator) {
        navigator.navigate(Route::Signup);
    }
}

pub struct SignupScreen {
    session: Arc<Session>,
    reporter: Arc<dyn Reporter>,
    form: Credentials,
}

impl SignupScreen {
    pub fn new(session: Arc<Session>, reporter: Arc<dyn Reporter>) -> Self {
        SignupScreen {
            session,
            reporter,
            form: Credentials::default(),
        }
    }

    pub fn set_email(&mut self, email: &str) {
        self.form.email = email.to_string();
    }

    pub fn set_password(&mut self, password: &str) {
        self.form.password = password.to_string();
    }

    pub fn form(&self) -> &Credentials {
        &self.form
    }

    /// Creates the account, then requests a verification email for it.
    ///
    /// The screen stays where it is either way. Returns `true` only when both
    /// steps succeeded.
    pub async fn submit(&mut self) -> bool {
        let signed_up = self
            .session
            .sign_up(&self.form.email, &self.form.password)
            .await;
        if let Err(e) = signed_up {
            self.reporter
                .report(ConditionKind::AuthFailed, &format!("signup failed: {}", e));
            return false;
        }

        if let Err(e) = self.session.send_verification_email().await {
            self.reporter.report(
                ConditionKind::AuthFailed,
                &format!("could not send verification email: {}", e),
            );
            return false;
        }
        true
    }

    pub fn go_to_login(&self, navigator: &dyn Navigator) {
        navigator.navigate(Route::Login);
    }
}

/// The map screen: search box, location button and the account sidebar.
pub struct HomeScreen {
    session: Arc<Session>,
    controller: LocationSearchController,
    sidebar_open: bool,
}

impl HomeScreen {
    pub fn new(session: Arc<Session>, controller: LocationSearchController) -> Self {
        HomeScreen {
            session,
            controller,
            sidebar_open: false,
        }
    }

    pub fn controller(&self) -> &LocationSearchController {
        &self.controller
    }

    pub fn display_name(&self) -> String {
        self.session
            .current_user_email()
            .filter(|email| !email.is_empty())
            .unwrap_or_else(|| ANONYMOUS_NAME.to_string())
    }

    /// Uppercased first character of the display name, shown on the menu button.
    pub fn avatar_initial(&self) -> String {
        self.display_name()
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }

    pub fn welcome_text(&self) -> String {
        format!("Welcome, {}", self.display_name())
    }

    pub fn is_sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
    }

    /// Signs out and returns to the login screen.
    pub fn logout(&mut self, navigator: &dyn Navigator) {
        self.session.sign_out();
        self.sidebar_open = false;
        navigator.navigate(Route::Login);
    }
}
