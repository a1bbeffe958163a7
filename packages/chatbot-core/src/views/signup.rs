//! Sign-up form
//!
//! Collects email and password, creates the account and, after showing a
//! confirmation for a short while, sends the user to the login screen.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

use super::{failure_message, lock, validate_email, validate_new_password, SubmitOutcome};
use crate::api::AuthApi;
use crate::navigation::{Navigator, Route};

/// How long the confirmation stays up before redirecting to login.
pub const REDIRECT_DELAY: Duration = Duration::from_secs(2);

/// Visible state of the sign-up form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpState {
    pub email: String,
    pub password: String,
    pub error: Option<String>,
    pub loading: bool,
    pub success: bool,
}

pub struct SignUpView {
    auth: Arc<dyn AuthApi>,
    navigator: Arc<dyn Navigator>,
    redirect_delay: Duration,
    state: Mutex<SignUpState>,
    redirect: Mutex<Option<JoinHandle<()>>>,
}

impl SignUpView {
    pub fn new(auth: Arc<dyn AuthApi>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            auth,
            navigator,
            redirect_delay: REDIRECT_DELAY,
            state: Mutex::new(SignUpState::default()),
            redirect: Mutex::new(None),
        }
    }

    pub fn with_redirect_delay(mut self, delay: Duration) -> Self {
        self.redirect_delay = delay;
        self
    }

    fn state(&self) -> MutexGuard<'_, SignUpState> {
        lock(&self.state)
    }

    pub fn snapshot(&self) -> SignUpState {
        self.state().clone()
    }

    pub fn set_email(&self, email: &str) {
        self.state().email = email.to_string();
    }

    pub fn set_password(&self, password: &str) {
        self.state().password = password.to_string();
    }

    /// Whether the submit button is enabled.
    pub fn can_submit(&self) -> bool {
        let state = self.state();
        !state.loading && !state.success
    }

    /// Submit the form. Ignored while a request is in flight and once the
    /// account has been created.
    pub async fn submit(&self) -> SubmitOutcome {
        let (email, password) = {
            let mut state = self.state();
            if state.loading || state.success {
                return SubmitOutcome::Ignored;
            }
            let validation =
                validate_email(&state.email).and_then(|_| validate_new_password(&state.password));
            if let Err(message) = validation {
                state.error = Some(message.to_string());
                return SubmitOutcome::Invalid;
            }
            state.error = None;
            state.loading = true;
            (state.email.trim().to_string(), state.password.clone())
        };

        let result = self.auth.sign_up(&email, &password).await;

        let mut state = self.state();
        state.loading = false;
        match result {
            Ok(()) => {
                tracing::info!("Account created for {}", email);
                state.success = true;
                drop(state);
                self.schedule_redirect();
                SubmitOutcome::Submitted
            }
            Err(e) => {
                tracing::warn!("Sign-up failed: {}", e);
                state.error = Some(failure_message(&e, "Failed to sign up"));
                SubmitOutcome::Failed
            }
        }
    }

    fn schedule_redirect(&self) {
        let navigator = self.navigator.clone();
        let delay = self.redirect_delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            navigator.navigate(Route::Login);
        });
        if let Some(previous) = lock(&self.redirect).replace(handle) {
            previous.abort();
        }
    }
}

impl Drop for SignUpView {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.redirect).take() {
            handle.abort();
        }
    }
}
