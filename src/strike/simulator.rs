use std::sync::Arc;

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSimulateTransactionConfig;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::transaction::Transaction;
use tracing::debug;

use crate::core::types::SimulationResult;

/// Marker line scanned for the consumed-unit count
const UNITS_CONSUMED_MARKER: &str = "compute units consumed";
/// Whitespace-delimited token position holding the unit count; fixed by the
/// log format this scanner targets
const UNITS_TOKEN_INDEX: usize = 3;

/// Dry-runs signed-but-unsent transactions against the chain before
/// broadcast. Shares the chain client's RPC connection handle.
pub struct TransactionSimulator {
    rpc: Arc<RpcClient>,
}

impl TransactionSimulator {
    pub fn new(rpc: Arc<RpcClient>) -> Self {
        Self { rpc }
    }

    /// Simulate a transaction with signature verification enabled. Never
    /// returns an error: RPC-level failures and on-chain errors are both
    /// captured verbatim in the result's error field.
    pub async fn simulate(&self, transaction: &Transaction) -> SimulationResult {
        let config = RpcSimulateTransactionConfig {
            sig_verify: true,
            commitment: Some(CommitmentConfig::confirmed()),
            ..RpcSimulateTransactionConfig::default()
        };

        let mut result = SimulationResult::default();
        match self
            .rpc
            .simulate_transaction_with_config(transaction, config)
            .await
        {
            Ok(response) => {
                let value = response.value;
                let logs = value.logs.unwrap_or_default();
                match value.err {
                    None => {
                        result.success = true;
                        result.units_consumed = extract_units_consumed(&logs);
                        result.logs = logs;
                        debug!(units_consumed = result.units_consumed, "simulation passed");
                    }
                    Some(err) => {
                        result.error = Some(err.to_string());
                        result.logs = logs;
                    }
                }
            }
            Err(e) => {
                result.error = Some(e.to_string());
            }
        }
        result
    }
}

/// Scans simulation logs for the fixed marker and parses the unit count from
/// its token position. Returns 0 when no line matches.
fn extract_units_consumed(logs: &[String]) -> u64 {
    for line in logs {
        if line.contains(UNITS_CONSUMED_MARKER) {
            let parts: Vec<&str> = line.split(' ').collect();
            if parts.len() > UNITS_TOKEN_INDEX {
                if let Ok(units) = parts[UNITS_TOKEN_INDEX].parse::<u64>() {
                    return units;
                }
            }
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_units_from_marker_line() {
        let logs = vec![
            "Program log: Instruction: Swap".to_string(),
            "compute units consumed: 48213 of 200000".to_string(),
        ];
        assert_eq!(extract_units_consumed(&logs), 48213);
    }

    #[test]
    fn returns_zero_without_marker() {
        let logs = vec!["Program log: Instruction: Swap".to_string()];
        assert_eq!(extract_units_consumed(&logs), 0);
    }

    #[test]
    fn returns_zero_when_token_is_not_numeric() {
        let logs = vec!["some compute units consumed unknown amount".to_string()];
        assert_eq!(extract_units_consumed(&logs), 0);
    }
}
