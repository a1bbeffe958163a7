//! Chatbot Core - conversation API clients and headless view models.
//!
//! This crate provides everything a chatbot front end needs apart from
//! drawing pixels:
//!
//! - **Types**: conversations, messages, users and auth sessions as the
//!   backend serialises them
//! - **Collaborators**: the [`ConversationsApi`] and [`AuthApi`] traits plus
//!   their HTTP implementations
//! - **Views**: sign-up, login and chat view models that own the view state
//!   and run the request/response flows against the collaborators
//! - **Navigation**: the [`Route`] enum and the [`Navigator`] seam views use
//!   to move between screens
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chatbot_core::api::{ApiClient, AuthClient, SessionStore};
//! use chatbot_core::views::ChatView;
//! use tokio::sync::mpsc;
//!
//! # async fn run() {
//! let session = Arc::new(SessionStore::new());
//! let api = Arc::new(ApiClient::new("http://localhost:8000", session.clone()));
//! let auth = Arc::new(AuthClient::new("https://project.supabase.co", "anon-key", session));
//! let (navigator, _routes) = mpsc::unbounded_channel();
//!
//! let chat = ChatView::new(api, auth, Arc::new(navigator));
//! chat.mount().await;
//! println!("{} conversations", chat.snapshot().conversations.len());
//! # }
//! ```

pub mod api;
pub mod navigation;
pub mod types;
pub mod views;

#[cfg(test)]
pub(crate) mod fakes;

// Re-export commonly used types
pub use api::{AuthApi, ConversationsApi};
pub use navigation::{Navigator, Route};
pub use types::{AuthSession, Conversation, Message, MessageRole, User, TEMP_MESSAGE_ID};

/// Error types for collaborator calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request failed: {status} {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Not signed in")]
    Unauthorized,

    /// Human-readable failure reported by the auth service.
    #[error("{0}")]
    Auth(String),

    #[error("JSON error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result type for collaborator calls.
pub type Result<T> = std::result::Result<T, ApiError>;
