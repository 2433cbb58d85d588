/// Aggregator price lookups for the per-token price monitor

use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde_json::Value;

const API_TIMEOUT_SECS: u64 = 15;

pub struct PriceFeed {
    client: Client,
    api_url: String,
}

impl PriceFeed {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(API_TIMEOUT_SECS))
                .build()
                .expect("Failed to create price HTTP client"),
            api_url: api_url.into(),
        }
    }

    /// Current USD price for a mint
    pub async fn get_token_price(&self, mint: &str) -> Result<f64> {
        let url = format!("{}/price?ids={}", self.api_url, mint);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("price API error: {}", response.status()));
        }

        let data: Value = response.json().await?;

        // Response shape: { "data": { "<mint>": { "price": 0.0123 } } }
        data["data"][mint]["price"]
            .as_f64()
            .ok_or_else(|| anyhow!("no price reported for {}", mint))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINT: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

    #[tokio::test]
    async fn parses_price_from_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/price")
            .match_query(mockito::Matcher::UrlEncoded("ids".into(), MINT.into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(r#"{{"data":{{"{}":{{"price":0.0042}}}}}}"#, MINT))
            .create_async()
            .await;

        let feed = PriceFeed::new(server.url());
        let price = feed.get_token_price(MINT).await.expect("price should parse");
        assert!((price - 0.0042).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn missing_token_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/price")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":{}}"#)
            .create_async()
            .await;

        let feed = PriceFeed::new(server.url());
        assert!(feed.get_token_price(MINT).await.is_err());
    }
}
