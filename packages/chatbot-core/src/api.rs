//! Collaborators the views talk to
//!
//! The traits are the seams the views depend on. [`ApiClient`] and
//! [`AuthClient`] are the HTTP implementations; both share a
//! [`SessionStore`] so conversation calls carry the signed-in user's token.

pub mod auth;
pub mod client;

pub use auth::AuthClient;
pub use client::ApiClient;

use async_trait::async_trait;
use std::sync::{PoisonError, RwLock};

use crate::types::{AuthSession, Conversation, Message, User};
use crate::Result;

/// Conversation and message operations of the chatbot backend.
#[async_trait]
pub trait ConversationsApi: Send + Sync {
    /// List the signed-in user's conversations, newest first.
    async fn list(&self) -> Result<Vec<Conversation>>;

    /// Create a conversation with the given title.
    async fn create(&self, title: &str) -> Result<Conversation>;

    /// Get every message of a conversation in chronological order.
    async fn get_messages(&self, conversation_id: &str) -> Result<Vec<Message>>;

    /// Send a user message; resolves to the assistant's reply.
    async fn send_message(&self, conversation_id: &str, content: &str) -> Result<Message>;
}

/// Account operations of the auth service.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<()>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<User>;

    async fn sign_out(&self) -> Result<()>;

    fn current_user(&self) -> Option<User>;
}

/// The signed-in session, shared between the auth and conversation clients.
#[derive(Debug, Default)]
pub struct SessionStore {
    session: RwLock<Option<AuthSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, session: AuthSession) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    pub fn clear(&self) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn get(&self) -> Option<AuthSession> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.get().map(|s| s.access_token)
    }

    pub fn user(&self) -> Option<User> {
        self.get().map(|s| s.user)
    }
}
