//! HTTP gateways for the remote service.
//!
//! Gateways are thin request/response wrappers: no caching, no retry, no status
//! interpretation beyond success/failure. [`ApiError::kind`] is where callers go when
//! they need to tell an expired session from a stale identifier.

pub mod auth;
pub mod todos;

use crate::config::ApiConfig;
use reqwest::Method;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not signed in")]
    MissingCredential,
    #[error("request failed: {0}")]
    Transport(String),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response: {0}")]
    Decode(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Authentication,
    Validation,
    NotFound,
    Server,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::MissingCredential => ErrorKind::Authentication,
            ApiError::Transport(_) => ErrorKind::Network,
            ApiError::Decode(_) => ErrorKind::Server,
            ApiError::Status { status, .. } => match status {
                401 | 403 => ErrorKind::Authentication,
                400 | 409 | 422 => ErrorKind::Validation,
                404 => ErrorKind::NotFound,
                _ => ErrorKind::Server,
            },
        }
    }
}

/// Shared HTTP plumbing for the gateways.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.max(1)))
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    fn send(&self, method: &Method, path: &str, builder: RequestBuilder) -> Result<Response, ApiError> {
        let resp = builder.send().map_err(|e| {
            tracing::debug!(%method, path, "transport error: {e}");
            ApiError::Transport(e.to_string())
        })?;

        let status = resp.status();
        tracing::debug!(%method, path, status = status.as_u16(), "response");
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: truncate_error(&body),
            });
        }
        Ok(resp)
    }

    fn send_json<T: DeserializeOwned>(
        &self,
        method: &Method,
        path: &str,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        self.send(method, path, builder)?
            .json()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

fn truncate_error(message: &str) -> String {
    let mut out = message.trim().replace(['\n', '\r'], " ");
    if out.chars().count() > 240 {
        out = out.chars().take(240).collect();
        out.push_str("...");
    }
    out
}
