//! HTTP client for the backend API.

use std::sync::Arc;

use local_store::{keys, KeyValueStore};
use reqwest::{header, Method};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::{ApiError, AuthResult};

/// JSON client bound to the backend base URL.
///
/// Authenticated requests carry the token found in the local store, when
/// there is one.
#[derive(Clone)]
pub struct ApiClient {
    /// Base URL without a trailing slash
    base_url: String,
    /// HTTP client
    http_client: reqwest::Client,
    /// Store holding the session token
    store: Arc<dyn KeyValueStore>,
}

impl ApiClient {
    /// Creates a client for `base_url`.
    pub fn new(base_url: &str, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client: reqwest::Client::new(),
            store,
        }
    }

    /// Sends a JSON request and returns the decoded JSON response.
    ///
    /// A response body that is not JSON decodes as an empty object. Non-2xx
    /// answers fail with the server's `message` field, or `Erro HTTP {status}`.
    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        auth: bool,
    ) -> AuthResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self
            .http_client
            .request(method.clone(), url.as_str())
            .header(header::CONTENT_TYPE, "application/json");

        if auth {
            if let Some(token) = self.store.get(keys::TOKEN).await? {
                builder = builder.bearer_auth(token);
            }
        }

        if let Some(body) = body {
            let payload = serde_json::to_vec(body)
                .map_err(|e| ApiError::InvalidResponse(format!("Unencodable body: {e}")))?;
            builder = builder.body(payload);
        }

        debug!(method = %method, path = %path, auth, "Sending API request");

        let response = builder.send().await.map_err(ApiError::from)?;
        let status = response.status();
        let text = response.text().await.map_err(ApiError::from)?;
        let data: Value =
            serde_json::from_str(&text).unwrap_or_else(|_| Value::Object(Default::default()));

        if !status.is_success() {
            let message = data
                .get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("Erro HTTP {}", status.as_u16()));

            debug!(path = %path, status = status.as_u16(), "API request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        Ok(data)
    }

    /// Sends a `POST` with a JSON body.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        auth: bool,
    ) -> AuthResult<Value> {
        self.request(Method::POST, path, Some(body), auth).await
    }

    /// Sends an authenticated `GET`.
    pub async fn get(&self, path: &str) -> AuthResult<Value> {
        self.request::<Value>(Method::GET, path, None, true).await
    }
}
