//! HTTP access to the remote users collection.
//!
//! The store only sees the [`UsersApi`] trait; [`HttpUsersApi`] is the
//! `reqwest` implementation used by the binary.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{User, UserPatch};

/// Service the screen talks to when no URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// Errors raised by the users service layer.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport failed (connect, timeout, TLS, ...)
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Service answered with a non-success status
    #[error("Request failed with status code {status}: {message}")]
    Status { status: u16, message: String },

    /// Body could not be decoded
    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// The two remote calls the store depends on.
#[async_trait]
pub trait UsersApi: Send + Sync {
    /// `GET /users`
    async fn list_users(&self) -> ApiResult<Vec<User>>;

    /// `PUT /users/{id}`, returning the service's echo of the record.
    async fn update_user(&self, patch: &UserPatch) -> ApiResult<UserPatch>;
}

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
    /// `None` keeps the transport default (no request timeout).
    pub timeout: Option<Duration>,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), timeout: None }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

pub struct HttpUsersApi {
    http: Client,
    base_url: String,
}

impl HttpUsersApi {
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        if config.base_url.trim().is_empty() {
            return Err(ApiError::InvalidUrl("URL cannot be empty".into()));
        }
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ApiError::InvalidUrl("URL must start with http:// or https://".into()));
        }

        let mut builder = Client::builder().user_agent(format!("userdesk/{}", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn users_url(&self) -> String {
        format!("{}/users", self.base_url)
    }
}

#[async_trait]
impl UsersApi for HttpUsersApi {
    async fn list_users(&self) -> ApiResult<Vec<User>> {
        let url = self.users_url();
        debug!(url = %url, "GET users");
        let response = self.http.get(&url).send().await?;
        decode(response).await
    }

    async fn update_user(&self, patch: &UserPatch) -> ApiResult<UserPatch> {
        let url = format!("{}/{}", self.users_url(), patch.id);
        debug!(url = %url, id = patch.id, "PUT user");
        let response = self.http.put(&url).json(patch).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!(status = status.as_u16(), error = %e, "could not read error body");
                String::new()
            }
        };
        let message = if body.trim().is_empty() {
            status.canonical_reason().unwrap_or("unknown error").to_string()
        } else {
            body
        };
        warn!(status = status.as_u16(), "users service returned an error");
        return Err(ApiError::Status { status: status.as_u16(), message });
    }
    response.json::<T>().await.map_err(|e| ApiError::Decode(e.to_string()))
}
