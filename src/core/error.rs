use thiserror::Error;

/// Failures talking to the market-data service
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("market-data request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("market-data service returned status {status}")]
    Status { status: u16 },
    #[error("no trading pairs found for token")]
    NotFound,
    #[error("malformed market-data response: {0}")]
    Malformed(String),
}

/// Failures talking to the swap router
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("router request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("router returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed router response: {0}")]
    Malformed(String),
}

/// Failures talking to the chain RPC
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("rpc request failed: {0}")]
    Transport(#[from] solana_client::client_error::ClientError),
    #[error("transaction submission failed after {attempts} attempts")]
    ExhaustedRetries { attempts: usize },
}

/// Stage-specific execution pipeline failure. Each stage short-circuits the
/// pipeline; a transaction is never broadcast after a failed stage.
#[derive(Debug, Error)]
pub enum SnipeError {
    #[error("quote request failed: {0}")]
    Quote(#[source] RouterError),
    #[error("swap transaction build failed: {0}")]
    Build(#[source] RouterError),
    #[error("swap transaction decode failed: {0}")]
    Decode(String),
    #[error("simulation rejected: {0}")]
    SimulationRejected(String),
    #[error("transaction submission failed: {0}")]
    Send(#[source] ChainError),
}

impl SnipeError {
    /// Pipeline stage the failure belongs to, for reporting
    pub fn stage(&self) -> &'static str {
        match self {
            SnipeError::Quote(_) => "quote",
            SnipeError::Build(_) => "build",
            SnipeError::Decode(_) => "decode",
            SnipeError::SimulationRejected(_) => "simulate",
            SnipeError::Send(_) => "send",
        }
    }
}
