use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use tracing::{info, warn};

use crate::core::error::SnipeError;
use crate::sniper::tracker::PendingSnipeTracker;

use super::jupiter::JupiterClient;
use super::rpc::ChainClient;
use super::simulator::TransactionSimulator;

/// Wrapped SOL mint, the input side of every buy
const SOL_MINT: &str = "So11111111111111111111111111111111111111112";

/// The quote -> build -> simulate -> send pipeline, shared by manual and
/// automatic snipes. Each stage short-circuits on failure; no transaction is
/// ever broadcast after a failed stage, and the pending-snipe entry for the
/// mint is released no matter how the pipeline ends.
pub struct SnipeExecutor {
    jupiter: Arc<JupiterClient>,
    chain: Arc<ChainClient>,
    simulator: Arc<TransactionSimulator>,
    tracker: Arc<PendingSnipeTracker>,
    buy_amount_lamports: u64,
    slippage_bps: u64,
}

impl SnipeExecutor {
    pub fn new(
        jupiter: Arc<JupiterClient>,
        chain: Arc<ChainClient>,
        simulator: Arc<TransactionSimulator>,
        tracker: Arc<PendingSnipeTracker>,
        buy_amount_lamports: u64,
        slippage_bps: u64,
    ) -> Self {
        Self {
            jupiter,
            chain,
            simulator,
            tracker,
            buy_amount_lamports,
            slippage_bps,
        }
    }

    /// Execute a buy of the given mint. Manual callers report the returned
    /// outcome; the automatic path relies on the logging here.
    pub async fn snipe(&self, mint_address: &str) -> Result<Signature, SnipeError> {
        let outcome = self.execute(mint_address).await;
        self.tracker.remove(mint_address);
        match &outcome {
            Ok(signature) => {
                info!(mint = %mint_address, %signature, "✅ snipe executed");
            }
            Err(e) => {
                warn!(mint = %mint_address, stage = e.stage(), error = %e, "❌ snipe aborted");
            }
        }
        outcome
    }

    async fn execute(&self, mint_address: &str) -> Result<Signature, SnipeError> {
        let quote = self
            .jupiter
            .get_quote(
                SOL_MINT,
                mint_address,
                self.buy_amount_lamports,
                self.slippage_bps,
            )
            .await
            .map_err(SnipeError::Quote)?;

        let wallet = self.chain.pubkey().to_string();
        let swap = self
            .jupiter
            .get_swap_transaction(&quote, &wallet)
            .await
            .map_err(SnipeError::Build)?;

        let transaction = decode_swap_transaction(&swap.swap_transaction)?;

        let simulation = self.simulator.simulate(&transaction).await;
        if !simulation.success {
            return Err(SnipeError::SimulationRejected(
                simulation
                    .error
                    .unwrap_or_else(|| "unknown simulation error".to_string()),
            ));
        }
        info!(
            mint = %mint_address,
            units_consumed = simulation.units_consumed,
            "simulation passed, submitting"
        );

        self.chain
            .send_transaction(transaction)
            .await
            .map_err(SnipeError::Send)
    }
}

/// Decode the router's base64 + bincode transaction payload into a signable
/// transaction
fn decode_swap_transaction(encoded: &str) -> Result<Transaction, SnipeError> {
    let bytes = BASE64
        .decode(encoded)
        .map_err(|e| SnipeError::Decode(format!("base64: {}", e)))?;
    bincode::deserialize(&bytes).map_err(|e| SnipeError::Decode(format!("bincode: {}", e)))
}
