//! Chatbot backend HTTP client

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

use super::{ConversationsApi, SessionStore};
use crate::types::{Conversation, CreateConversationRequest, Message, SendMessageRequest};
use crate::{ApiError, Result};

const API_PREFIX: &str = "/api/v1";

/// HTTP client for the chatbot backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
    session: Arc<SessionStore>,
}

impl ApiClient {
    /// Create a new client with the given base URL
    pub fn new(base_url: &str, session: Arc<SessionStore>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
            session,
        }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ========================================================================
    // Internal HTTP Methods
    // ========================================================================

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.access_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                status,
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(response)
    }

    /// Make a GET request
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.authorize(self.client.get(self.url(path)));
        let response = Self::check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    /// Make a POST request
    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let request = self.authorize(self.client.post(self.url(path)).json(body));
        let response = Self::check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    // ========================================================================
    // Health API
    // ========================================================================

    /// Check if the backend is reachable
    pub async fn health(&self) -> Result<bool> {
        match self.client.get(format!("{}/health", self.base_url)).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }
}

#[async_trait]
impl ConversationsApi for ApiClient {
    async fn list(&self) -> Result<Vec<Conversation>> {
        tracing::debug!("Listing conversations");
        self.get("/conversations").await
    }

    async fn create(&self, title: &str) -> Result<Conversation> {
        tracing::debug!("Creating conversation {:?}", title);
        let request = CreateConversationRequest {
            title: title.to_string(),
        };
        self.post("/conversations", &request).await
    }

    async fn get_messages(&self, conversation_id: &str) -> Result<Vec<Message>> {
        tracing::debug!("Loading messages for {}", conversation_id);
        self.get(&format!("/conversations/{}/messages", conversation_id))
            .await
    }

    async fn send_message(&self, conversation_id: &str, content: &str) -> Result<Message> {
        tracing::debug!("Sending message to {}", conversation_id);
        let request = SendMessageRequest {
            content: content.to_string(),
        };
        self.post(&format!("/conversations/{}/messages", conversation_id), &request)
            .await
    }
}
