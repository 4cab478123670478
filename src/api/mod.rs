//! Thin bindings for the sentiment service's REST API.
//!
//! Every endpoint answers with a JSON envelope `{ success, data, message }`.
//! Non-2xx answers become [`ClientError::ApiError`] carrying the server's
//! `message`.

pub mod auth;
pub mod classifier;
pub mod data;
pub mod reviews;
pub mod schedules;

use crate::utils::error::{ClientError, Result};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

pub use classifier::ClassifierSubmitter;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
const FALLBACK_ERROR_MESSAGE: &str = "API request failed";

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            token: None,
        }
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            token: None,
        })
    }

    /// Same client, authenticated with `token` (or anonymous for `None`).
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub(crate) fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), endpoint)
    }

    /// Sends one request and returns the decoded envelope.
    pub(crate) async fn call(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<Value> {
        let url = self.url(endpoint);
        tracing::debug!("📡 {} {}", method, url);

        let mut request = self.client.request(method, &url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let envelope: Value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        tracing::debug!("📡 {} -> {}", url, status);

        if !status.is_success() {
            let message = envelope
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or(FALLBACK_ERROR_MESSAGE)
                .to_string();
            return Err(ClientError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(envelope)
    }

    pub(crate) async fn get_data<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let envelope = self.call(Method::GET, endpoint, query, None).await?;
        data(envelope)
    }

    pub(crate) async fn post_data<T: DeserializeOwned>(&self, endpoint: &str, body: Value) -> Result<T> {
        let envelope = self.call(Method::POST, endpoint, &[], Some(body)).await?;
        data(envelope)
    }
}

/// Pulls the `data` field out of a response envelope.
pub(crate) fn data<T: DeserializeOwned>(envelope: Value) -> Result<T> {
    let data = match envelope {
        Value::Object(mut map) => map.remove("data").unwrap_or(Value::Null),
        other => other,
    };
    Ok(serde_json::from_value(data)?)
}
