//! Headless view models
//!
//! Each view owns its state behind a mutex and exposes `&self` operations, so
//! a front end can fire overlapping events the way a UI does. The mutex is
//! never held across a collaborator call.

pub mod chat;
pub mod login;
pub mod signup;

pub use chat::{ChatState, ChatView, SendOutcome};
pub use login::{LoginState, LoginView};
pub use signup::{SignUpState, SignUpView};

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::ApiError;

/// Minimum password length accepted by the sign-up form.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Result of submitting a credentials form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The collaborator accepted the request
    Submitted,
    /// Client-side validation blocked the request
    Invalid,
    /// A request is already in flight
    Ignored,
    /// The collaborator rejected the request
    Failed,
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Check the email field the way an `type=email, required` input does.
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    let email = email.trim();
    if email.is_empty() {
        return Err("Please enter your email address");
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err("Please enter a valid email address"),
    }
}

pub fn validate_new_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err("Password must be at least 6 characters");
    }
    Ok(())
}

/// The collaborator's own message, or `fallback` if it has none.
pub(crate) fn failure_message(err: &ApiError, fallback: &str) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
