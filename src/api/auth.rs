// src/api/auth.rs
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::ServiceClient;
use crate::error::ApiError;

const GENERATE_TOKEN_ENDPOINT: &str = "/auth/generate-token";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateTokenRequest<'a> {
    user_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub token: Option<String>,
}

impl ServiceClient {
    /// Exchange the host application's user id for an API token
    pub async fn generate_token(&self, user_id: &str) -> Result<Option<String>, ApiError> {
        info!("Requesting API token for user {}", user_id);
        let response: TokenResponse = self
            .post_json(GENERATE_TOKEN_ENDPOINT, &GenerateTokenRequest { user_id })
            .await?;
        Ok(response.token.filter(|token| !token.is_empty()))
    }
}
