/// DexScreener-style market-data client for token pair lookups

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::error::MarketDataError;

const API_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DexScreenerResponse {
    #[serde(rename = "schemaVersion")]
    pub schema_version: Option<String>,
    pub pairs: Option<Vec<TokenPair>>,
}

/// One trading pair as reported by the market-data service. Everything is
/// optional; the service omits fields freely for young tokens.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TokenPair {
    #[serde(rename = "pairAddress")]
    pub pair_address: Option<String>,
    pub liquidity: Option<Liquidity>,
    /// Set when the service has flagged the token as a honeypot
    pub honeypot: Option<bool>,
    #[serde(rename = "priceUsd")]
    pub price_usd: Option<String>,
    #[serde(rename = "marketCap")]
    pub market_cap: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Liquidity {
    pub usd: Option<f64>,
    pub lock: Option<LiquidityLock>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LiquidityLock {
    pub locked: Option<bool>,
}

pub struct DexScreenerClient {
    client: Client,
    base_url: String,
}

impl DexScreenerClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(API_TIMEOUT_SECS))
                .build()
                .expect("Failed to create market-data HTTP client"),
            base_url: base_url.into(),
        }
    }

    /// Fetch pair listings for a mint. `NotFound` when the service knows no
    /// pairs for it, which is the normal case for very young tokens.
    pub async fn get_token_pairs(&self, mint: &str) -> Result<Vec<TokenPair>, MarketDataError> {
        let url = format!("{}/tokens/{}", self.base_url, mint);
        debug!(%mint, "fetching token pairs");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MarketDataError::Status {
                status: status.as_u16(),
            });
        }

        let data: DexScreenerResponse = response
            .json()
            .await
            .map_err(|e| MarketDataError::Malformed(e.to_string()))?;

        match data.pairs {
            Some(pairs) if !pairs.is_empty() => Ok(pairs),
            _ => Err(MarketDataError::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn parses_pairs_from_response() {
        let mut server = mockito::Server::new_async().await;
        let body = r#"{
            "schemaVersion": "1.0.0",
            "pairs": [{
                "pairAddress": "58oQChx4yWmvKdwLLZzBi4ChoCc2fqCUWBkwMihLYQo2",
                "liquidity": { "usd": 25000.0, "lock": { "locked": true } },
                "honeypot": false,
                "priceUsd": "0.0013"
            }]
        }"#;
        let _mock = server
            .mock("GET", "/tokens/SomeMint111111111111111111111111")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let client = DexScreenerClient::new(server.url());
        let pairs = client
            .get_token_pairs("SomeMint111111111111111111111111")
            .await
            .expect("pairs should parse");
        assert_eq!(pairs.len(), 1);
        let liquidity = pairs[0].liquidity.as_ref().unwrap();
        assert_eq!(liquidity.usd, Some(25000.0));
        assert_eq!(
            liquidity.lock.as_ref().and_then(|lock| lock.locked),
            Some(true)
        );
    }

    #[tokio::test]
    async fn null_pairs_map_to_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/tokens/UnknownMint")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"schemaVersion":"1.0.0","pairs":null}"#)
            .create_async()
            .await;

        let client = DexScreenerClient::new(server.url());
        let result = client.get_token_pairs("UnknownMint").await;
        assert!(matches!(result, Err(MarketDataError::NotFound)));
    }

    #[tokio::test]
    async fn non_success_status_maps_to_status_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/tokens/AnyMint")
            .with_status(502)
            .create_async()
            .await;

        let client = DexScreenerClient::new(server.url());
        let result = client.get_token_pairs("AnyMint").await;
        assert!(matches!(
            result,
            Err(MarketDataError::Status { status: 502 })
        ));
    }
}
