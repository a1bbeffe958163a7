//! Login form

use std::sync::{Arc, Mutex, MutexGuard};

use super::{failure_message, lock, validate_email, SubmitOutcome};
use crate::api::AuthApi;
use crate::navigation::{Navigator, Route};

/// Visible state of the login form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginState {
    pub email: String,
    pub password: String,
    pub error: Option<String>,
    pub loading: bool,
}

pub struct LoginView {
    auth: Arc<dyn AuthApi>,
    navigator: Arc<dyn Navigator>,
    state: Mutex<LoginState>,
}

impl LoginView {
    pub fn new(auth: Arc<dyn AuthApi>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            auth,
            navigator,
            state: Mutex::new(LoginState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, LoginState> {
        lock(&self.state)
    }

    pub fn snapshot(&self) -> LoginState {
        self.state().clone()
    }

    pub fn set_email(&self, email: &str) {
        self.state().email = email.to_string();
    }

    pub fn set_password(&self, password: &str) {
        self.state().password = password.to_string();
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let (email, password) = {
            let mut state = self.state();
            if state.loading {
                return SubmitOutcome::Ignored;
            }
            let validation = validate_email(&state.email).and_then(|_| {
                if state.password.is_empty() {
                    Err("Please enter your password")
                } else {
                    Ok(())
                }
            });
            if let Err(message) = validation {
                state.error = Some(message.to_string());
                return SubmitOutcome::Invalid;
            }
            state.error = None;
            state.loading = true;
            (state.email.trim().to_string(), state.password.clone())
        };

        let result = self.auth.sign_in(&email, &password).await;

        {
            let mut state = self.state();
            state.loading = false;
            if let Err(e) = &result {
                tracing::warn!("Sign-in failed: {}", e);
                state.error = Some(failure_message(e, "Failed to sign in"));
                return SubmitOutcome::Failed;
            }
            // Don't leave the password lying around once it has been used
            state.password.clear();
        }

        tracing::info!("Signed in as {}", email);
        self.navigator.navigate(Route::Chat);
        SubmitOutcome::Submitted
    }
}
