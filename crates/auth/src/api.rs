//! Authentication collaborator.
//!
//! Credentials are only ever checked by the backend; nothing in this crate
//! compares secrets locally.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ApiClient, ApiError, AuthResult};

/// Login endpoint.
pub const LOGIN_PATH: &str = "/api/auth/login";

/// Password reset endpoint.
pub const FORGOT_PASSWORD_PATH: &str = "/api/auth/forgot-password";

/// Successful login answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Opaque session token.
    pub token: String,
    /// User snapshot, when the backend sends one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
}

impl LoginResponse {
    /// Creates a response with a token and no user snapshot.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user: None,
        }
    }

    /// Attaches a user snapshot.
    pub fn with_user(mut self, user: Value) -> Self {
        self.user = Some(user);
        self
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct ForgotPasswordRequest<'a> {
    email: &'a str,
}

/// Trait for the authentication backend
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Verifies credentials and returns the session token
    async fn login(&self, email: &str, password: &str) -> AuthResult<LoginResponse>;

    /// Starts a password reset for `email`
    async fn forgot_password(&self, email: &str) -> AuthResult<()>;
}

/// [`AuthApi`] over the backend HTTP API.
#[derive(Clone)]
pub struct HttpAuthApi {
    client: ApiClient,
}

impl HttpAuthApi {
    /// Creates the collaborator on top of `client`.
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, email: &str, password: &str) -> AuthResult<LoginResponse> {
        let data = self
            .client
            .post(LOGIN_PATH, &LoginRequest { email, password }, false)
            .await?;

        serde_json::from_value(data)
            .map_err(|e| ApiError::InvalidResponse(format!("Login response: {e}")).into())
    }

    async fn forgot_password(&self, email: &str) -> AuthResult<()> {
        self.client
            .post(FORGOT_PASSWORD_PATH, &ForgotPasswordRequest { email }, false)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        http::{HeaderMap, StatusCode},
        routing::{get, post},
        Json, Router,
    };
    use local_store::{KeyValueStore, MemoryStore};
    use serde_json::json;

    use super::*;
    use crate::AuthError;

    async fn login_handler(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        if body["password"] == "123456" {
            (
                StatusCode::OK,
                Json(json!({ "token": "tok-1", "user": { "email": body["email"] } })),
            )
        } else {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": "Credenciais inválidas." })),
            )
        }
    }

    async fn whoami_handler(headers: HeaderMap) -> Json<Value> {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        Json(json!({ "authorization": auth }))
    }

    async fn spawn_backend() -> String {
        let app = Router::new()
            .route(LOGIN_PATH, post(login_handler))
            .route(FORGOT_PASSWORD_PATH, post(|| async { StatusCode::NO_CONTENT }))
            .route("/api/me", get(whoami_handler))
            .route(
                "/api/broken",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "oops") }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    #[tokio::test]
    async fn test_login_success() {
        let base_url = spawn_backend().await;
        let api = HttpAuthApi::new(ApiClient::new(&base_url, Arc::new(MemoryStore::new())));

        let response = api.login("a@b.com", "123456").await.unwrap();
        assert_eq!(response.token, "tok-1");
        assert_eq!(response.user, Some(json!({ "email": "a@b.com" })));
    }

    #[tokio::test]
    async fn test_login_failure_uses_server_message() {
        let base_url = spawn_backend().await;
        let api = HttpAuthApi::new(ApiClient::new(&base_url, Arc::new(MemoryStore::new())));

        let err = api.login("a@b.com", "wrong").await.unwrap_err();
        match err {
            AuthError::Api(ApiError::Status { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Credenciais inválidas.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_forgot_password_ignores_empty_body() {
        let base_url = spawn_backend().await;
        let api = HttpAuthApi::new(ApiClient::new(&base_url, Arc::new(MemoryStore::new())));

        api.forgot_password("a@b.com").await.unwrap();
    }

    #[tokio::test]
    async fn test_generic_http_error_message() {
        let base_url = spawn_backend().await;
        let client = ApiClient::new(&base_url, Arc::new(MemoryStore::new()));

        let err = client.get("/api/broken").await.unwrap_err();
        assert_eq!(err.to_string(), "Erro HTTP 500");
    }

    #[tokio::test]
    async fn test_bearer_token_attached_when_present() {
        let base_url = spawn_backend().await;
        let store = Arc::new(MemoryStore::new());
        let client = ApiClient::new(&base_url, store.clone());

        let anonymous = client.get("/api/me").await.unwrap();
        assert_eq!(anonymous["authorization"], "");

        store.set("token", "tok-1").await.unwrap();
        let authenticated = client.get("/api/me").await.unwrap();
        assert_eq!(authenticated["authorization"], "Bearer tok-1");

        // Unauthenticated requests never carry the token
        let explicit = client
            .request::<Value>(reqwest::Method::GET, "/api/me", None, false)
            .await
            .unwrap();
        assert_eq!(explicit["authorization"], "");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        // Bind then drop a listener to get a port nobody serves
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ApiClient::new(&format!("http://{addr}"), Arc::new(MemoryStore::new()));
        let api = HttpAuthApi::new(client);

        let err = api.login("a@b.com", "123456").await.unwrap_err();
        assert!(matches!(err, AuthError::Api(ApiError::Network(_))));
    }
}
