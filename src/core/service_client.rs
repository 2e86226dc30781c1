// src/core/service_client.rs
//! HTTP client for the profile backend: bearer token, GET de-duplication, 401 logout

use anyhow::{Context, Result};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, trace, warn};

use crate::core::dedup::{request_key, PendingRequests, RawResponse};
use crate::environment::WizardConfig;
use crate::error::ApiError;
use crate::session::Session;

pub struct ServiceClient {
    client: reqwest::Client,
    base_url: String,
    session: Arc<Session>,
    pending: PendingRequests,
}

impl ServiceClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        dedup_window: Duration,
        session: Arc<Session>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            pending: PendingRequests::new(dedup_window),
        })
    }

    pub fn from_config(config: &WizardConfig, session: Arc<Session>) -> Result<Self> {
        Self::new(
            &config.api_url,
            config.timeout(),
            config.dedup_window(),
            session,
        )
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Generic GET request, de-duplicated within the pending-request window
    pub async fn get<R>(&self, endpoint: &str) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
    {
        self.get_with_params(endpoint, &[]).await
    }

    pub async fn get_with_params<R>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
    {
        let url = self.url(endpoint);
        let key_params = (!params.is_empty()).then(|| {
            serde_json::Value::Object(
                params
                    .iter()
                    .map(|(k, v)| (k.to_string(), serde_json::Value::from(*v)))
                    .collect(),
            )
        });
        let key = request_key("get", &url, key_params.as_ref());

        let mut builder = self.authorized(self.client.get(&url), &url).await;
        if !params.is_empty() {
            builder = builder.query(params);
        }

        let outcome = self.pending.run(key, execute(builder)).await;
        self.interpret(outcome, &url).await
    }

    /// Generic POST request with JSON
    pub async fn post_json<T, R>(&self, endpoint: &str, payload: &T) -> Result<R, ApiError>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url(endpoint);
        let builder = self.authorized(self.client.post(&url), &url).await;
        let outcome = execute(builder.json(payload)).await;
        self.interpret(outcome, &url).await
    }

    pub async fn put_json<T, R>(&self, endpoint: &str, payload: &T) -> Result<R, ApiError>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url(endpoint);
        let builder = self.authorized(self.client.put(&url), &url).await;
        let outcome = execute(builder.json(payload)).await;
        self.interpret(outcome, &url).await
    }

    pub async fn delete<R>(&self, endpoint: &str) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
    {
        let url = self.url(endpoint);
        let builder = self.authorized(self.client.delete(&url), &url).await;
        let outcome = execute(builder).await;
        self.interpret(outcome, &url).await
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Always reads the token fresh so a new login is picked up immediately
    async fn authorized(&self, builder: RequestBuilder, url: &str) -> RequestBuilder {
        let builder = builder.header("Content-Type", "application/json");

        match self.session.token().await {
            Ok(Some(token)) => {
                trace!("Adding token to request: {}", url);
                builder.bearer_auth(token)
            }
            Ok(None) => {
                warn!("No token available for request: {}", url);
                builder
            }
            Err(e) => {
                warn!("Could not read token for request {}: {}", url, e);
                builder
            }
        }
    }

    async fn interpret<R>(
        &self,
        outcome: Result<RawResponse, ApiError>,
        url: &str,
    ) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
    {
        let response = outcome?;

        if response.status == 401 {
            error!("Authentication error on {}. Token may be invalid.", url);
            self.session.handle_unauthorized().await;
            return Err(ApiError::Unauthorized);
        }

        if !(200..300).contains(&response.status) {
            let message = error_message(&response.body);
            error!("HTTP {} from {}: {}", response.status, url, message);
            return Err(ApiError::Status {
                status: response.status,
                message,
            });
        }

        let body = if response.body.trim().is_empty() {
            "null"
        } else {
            response.body.as_str()
        };

        serde_json::from_str::<R>(body).map_err(|e| {
            debug!("Undecodable response from {}: {}", url, response.body);
            ApiError::Decode(e.to_string())
        })
    }
}

async fn execute(builder: RequestBuilder) -> Result<RawResponse, ApiError> {
    let response = builder
        .send()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    let status = response.status().as_u16();
    trace!("Response status: {}", status);

    let body = response
        .text()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    Ok(RawResponse { status, body })
}

/// Prefer the backend's own `message`/`error` field over the raw body
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "error"]
                .iter()
                .find_map(|field| value.get(field).and_then(|v| v.as_str()).map(String::from))
        })
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                "Unknown error".to_string()
            } else {
                body.to_string()
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_backend_fields() {
        assert_eq!(error_message(r#"{"message":"Profile not found"}"#), "Profile not found");
        assert_eq!(error_message(r#"{"error":"bad token"}"#), "bad token");
        assert_eq!(error_message("gateway timeout"), "gateway timeout");
        assert_eq!(error_message(""), "Unknown error");
    }
}
