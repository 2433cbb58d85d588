/// Jupiter-style swap router client: price quotes and serialized swap
/// transactions for execution.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::core::error::RouterError;

const API_TIMEOUT_SECS: u64 = 30;

/// Router quote. The named fields are what the pipeline reads; everything
/// else rides along in `extra` so the quote round-trips to the swap-build
/// endpoint byte-for-byte equivalent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapQuote {
    /// Input token mint
    pub input_mint: String,
    /// Output token mint
    pub output_mint: String,
    /// Input amount in base units
    pub in_amount: String,
    /// Output amount in base units
    pub out_amount: String,
    /// Price impact percentage
    pub price_impact_pct: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Swap-build request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SwapRequest<'a> {
    quote_response: &'a SwapQuote,
    user_public_key: &'a str,
    wrap_and_unwrap_sol: bool,
    dynamic_compute_unit_limit: bool,
    dynamic_slippage: bool,
}

/// Serialized swap transaction returned by the router
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapTransaction {
    /// base64-encoded wire transaction
    pub swap_transaction: String,
    /// Last block height the transaction is valid at
    pub last_valid_block_height: Option<u64>,
}

pub struct JupiterClient {
    client: Client,
    api_url: String,
}

impl JupiterClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(API_TIMEOUT_SECS))
                .build()
                .expect("Failed to create router HTTP client"),
            api_url: api_url.into(),
        }
    }

    /// Request a swap quote
    pub async fn get_quote(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount: u64,
        slippage_bps: u64,
    ) -> Result<SwapQuote, RouterError> {
        let url = format!("{}/quote", self.api_url);
        let params = [
            ("inputMint", input_mint.to_string()),
            ("outputMint", output_mint.to_string()),
            ("amount", amount.to_string()),
            ("slippageBps", slippage_bps.to_string()),
        ];

        debug!(%input_mint, %output_mint, amount, slippage_bps, "requesting quote");

        let response = self.client.get(&url).query(&params).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RouterError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let quote: SwapQuote = response
            .json()
            .await
            .map_err(|e| RouterError::Malformed(e.to_string()))?;
        debug!(in_amount = %quote.in_amount, out_amount = %quote.out_amount, "quote received");
        Ok(quote)
    }

    /// Request a serialized swap transaction for a quote, addressed to the
    /// given wallet
    pub async fn get_swap_transaction(
        &self,
        quote: &SwapQuote,
        user_public_key: &str,
    ) -> Result<SwapTransaction, RouterError> {
        let url = format!("{}/swap", self.api_url);
        let request = SwapRequest {
            quote_response: quote,
            user_public_key,
            wrap_and_unwrap_sol: true,
            dynamic_compute_unit_limit: true,
            dynamic_slippage: true,
        };

        debug!(output_mint = %quote.output_mint, "requesting swap transaction");

        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RouterError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| RouterError::Malformed(e.to_string()))
    }
}
