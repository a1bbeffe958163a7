//! Data model shared by the API clients and the views

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Id carried by a user message that is shown before the server confirms it.
pub const TEMP_MESSAGE_ID: &str = "temp";

// ============================================================================
// Conversation Types
// ============================================================================

/// Conversation as listed in the sidebar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Request to create a new conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateConversationRequest {
    pub title: String,
}

// ============================================================================
// Message Types
// ============================================================================

/// A single chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Build the local echo of a user message that has not been confirmed yet.
    pub fn optimistic(conversation_id: &str, content: &str) -> Self {
        Self {
            id: TEMP_MESSAGE_ID.to_string(),
            conversation_id: conversation_id.to_string(),
            role: MessageRole::User,
            content: content.to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn is_temp(&self) -> bool {
        self.id == TEMP_MESSAGE_ID
    }
}

/// Message role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    #[default]
    User,
    Assistant,
    System,
}

/// Request to send a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

// ============================================================================
// Auth Types
// ============================================================================

/// Authenticated user identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: String,
}

/// Tokens handed out by the auth service after a password sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: i64,
    pub user: User,
}

/// Email/password pair sent to the auth service
#[derive(Debug, Clone, Serialize)]
pub struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}
