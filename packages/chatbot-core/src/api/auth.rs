//! Auth service client (Supabase GoTrue REST endpoints)

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use std::sync::Arc;

use super::{AuthApi, SessionStore};
use crate::types::{AuthSession, Credentials, User};
use crate::{ApiError, Result};

/// Fields the auth service may put its human-readable error in, by priority.
const ERROR_FIELDS: [&str; 4] = ["msg", "error_description", "message", "error"];

/// HTTP client for sign-up, sign-in and sign-out
#[derive(Debug, Clone)]
pub struct AuthClient {
    base_url: String,
    api_key: String,
    client: Client,
    session: Arc<SessionStore>,
}

impl AuthClient {
    pub fn new(base_url: &str, api_key: &str, session: Arc<SessionStore>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client: Client::new(),
            session,
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.base_url, path)
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body).unwrap_or_else(|| {
            format!(
                "Request failed: {}",
                status.canonical_reason().unwrap_or(status.as_str())
            )
        });
        Err(ApiError::Auth(message))
    }
}

/// Extract the human-readable message from an auth error body.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ERROR_FIELDS
        .iter()
        .filter_map(|field| value.get(field).and_then(Value::as_str))
        .find(|message| !message.trim().is_empty())
        .map(str::to_string)
}

#[async_trait]
impl AuthApi for AuthClient {
    async fn sign_up(&self, email: &str, password: &str) -> Result<()> {
        tracing::info!("Signing up {}", email);
        let response = self
            .client
            .post(self.url("/signup"))
            .header("apikey", &self.api_key)
            .json(&Credentials { email, password })
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<User> {
        tracing::info!("Signing in {}", email);
        let response = self
            .client
            .post(self.url("/token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.api_key)
            .json(&Credentials { email, password })
            .send()
            .await?;
        let session: AuthSession = Self::check(response).await?.json().await?;
        let user = session.user.clone();
        self.session.set(session);
        Ok(user)
    }

    async fn sign_out(&self) -> Result<()> {
        let Some(token) = self.session.access_token() else {
            return Ok(());
        };
        // The local session goes away even if the server call fails.
        self.session.clear();
        tracing::info!("Signing out");
        let response = self
            .client
            .post(self.url("/logout"))
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    fn current_user(&self) -> Option<User> {
        self.session.user()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(uri: &str) -> AuthClient {
        AuthClient::new(uri, "anon-key", Arc::new(SessionStore::new()))
    }

    #[tokio::test]
    async fn test_sign_up_posts_credentials() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .and(header("apikey", "anon-key"))
            .and(body_json(json!({ "email": "ada@example.com", "password": "secret1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "u1",
                "email": "ada@example.com"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let auth = client(&mock_server.uri());
        auth.sign_up("ada@example.com", "secret1").await.unwrap();

        // Sign-up alone does not sign the user in
        assert!(auth.current_user().is_none());
    }

    #[tokio::test]
    async fn test_sign_up_surfaces_service_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "code": 422,
                "msg": "User already registered"
            })))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server.uri())
            .sign_up("ada@example.com", "secret1")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "User already registered");
    }

    #[tokio::test]
    async fn test_sign_in_stores_session() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "jwt-token",
                "token_type": "bearer",
                "expires_in": 3600,
                "refresh_token": "refresh",
                "user": { "id": "u1", "email": "ada@example.com" }
            })))
            .mount(&mock_server)
            .await;

        let auth = client(&mock_server.uri());
        let user = auth.sign_in("ada@example.com", "secret1").await.unwrap();

        assert_eq!(user.email, "ada@example.com");
        assert_eq!(auth.session().access_token().as_deref(), Some("jwt-token"));
        assert_eq!(auth.current_user(), Some(user));
    }

    #[tokio::test]
    async fn test_sign_in_rejected() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            })))
            .mount(&mock_server)
            .await;

        let auth = client(&mock_server.uri());
        let err = auth.sign_in("ada@example.com", "wrong-pw").await.unwrap_err();

        assert_eq!(err.to_string(), "Invalid login credentials");
        assert!(auth.current_user().is_none());
    }

    #[tokio::test]
    async fn test_sign_out_clears_session() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "jwt-token",
                "expires_in": 3600,
                "user": { "id": "u1", "email": "ada@example.com" }
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .and(header("authorization", "Bearer jwt-token"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let auth = client(&mock_server.uri());
        auth.sign_in("ada@example.com", "secret1").await.unwrap();
        auth.sign_out().await.unwrap();

        assert!(auth.current_user().is_none());
    }

    #[test]
    fn test_error_message_priority() {
        assert_eq!(
            error_message(r#"{"error": "invalid_grant", "error_description": "Bad creds"}"#),
            Some("Bad creds".to_string())
        );
        assert_eq!(
            error_message(r#"{"message": "Signups not allowed"}"#),
            Some("Signups not allowed".to_string())
        );
        assert_eq!(error_message(r#"{"msg": ""}"#), None);
        assert_eq!(error_message("<html>bad gateway</html>"), None);
    }
}
