//! HTTP client for the blockchain-intent collaborator.
//!
//! The NFT service interprets item/ledger chat ("mint me a sword") and
//! performs the underlying token operations itself; the engine only relays
//! its verdicts.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::infrastructure::ports::{BlockchainError, BlockchainPort, IntentVerdict};

/// Default intent service URL.
pub const DEFAULT_INTENT_BASE_URL: &str = "http://localhost:3000";

/// Client for the blockchain-intent HTTP endpoint
#[derive(Clone)]
pub struct IntentClient {
    client: Client,
    base_url: String,
}

impl IntentClient {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create client from the `BLOCKCHAIN_INTENT_URL` environment variable.
    pub fn from_env() -> Self {
        let base_url = std::env::var("BLOCKCHAIN_INTENT_URL")
            .unwrap_or_else(|_| DEFAULT_INTENT_BASE_URL.to_string());
        Self::new(&base_url)
    }
}

#[derive(Debug, Serialize)]
struct IntentRequest<'a> {
    message: &'a str,
    #[serde(rename = "locationId")]
    location_id: &'a str,
}

#[async_trait]
impl BlockchainPort for IntentClient {
    async fn handle_intent(
        &self,
        message: &str,
        location_id: &str,
    ) -> Result<IntentVerdict, BlockchainError> {
        let response = self
            .client
            .post(format!("{}/api/blockchain", self.base_url))
            .json(&IntentRequest {
                message,
                location_id,
            })
            .send()
            .await
            .map_err(|e| BlockchainError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .map_err(|e| BlockchainError::Unavailable(e.to_string()))?;
            return Err(BlockchainError::Unavailable(error_text));
        }

        response
            .json::<IntentVerdict>()
            .await
            .map_err(|e| BlockchainError::InvalidResponse(e.to_string()))
    }
}
