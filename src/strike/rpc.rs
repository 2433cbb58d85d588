use std::future::Future;
use std::sync::Arc;

use solana_client::client_error::ClientError;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::native_token::lamports_to_sol;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::transaction::Transaction;
use solana_transaction_status::{EncodedConfirmedTransactionWithStatusMeta, UiTransactionEncoding};
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

use crate::core::error::ChainError;

/// Delay between submission attempts. Fixed, no backoff growth.
const SEND_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Chain RPC wrapper. Exclusively owns the signing key; the RPC connection
/// handle is shared with the simulator.
pub struct ChainClient {
    rpc: Arc<RpcClient>,
    keypair: Keypair,
    max_send_retries: usize,
}

impl ChainClient {
    pub fn new(rpc_http_url: &str, keypair: Keypair, max_send_retries: usize) -> Self {
        let rpc = Arc::new(RpcClient::new_with_commitment(
            rpc_http_url.to_string(),
            CommitmentConfig::confirmed(),
        ));
        Self {
            rpc,
            keypair,
            max_send_retries,
        }
    }

    /// Shared handle to the underlying RPC connection
    pub fn rpc_handle(&self) -> Arc<RpcClient> {
        self.rpc.clone()
    }

    /// Wallet public key
    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    /// Wallet balance in lamports. Best-effort: returns 0 on any RPC error
    /// instead of propagating, so status paths never fail on it.
    pub async fn get_balance(&self) -> u64 {
        match self.rpc.get_balance(&self.keypair.pubkey()).await {
            Ok(lamports) => lamports,
            Err(e) => {
                warn!(error = %e, "balance query failed");
                0
            }
        }
    }

    /// Wallet balance in SOL, for operator-facing output
    pub async fn get_balance_sol(&self) -> f64 {
        lamports_to_sol(self.get_balance().await)
    }

    /// Look up a confirmed transaction by signature
    pub async fn get_transaction(
        &self,
        signature: &Signature,
    ) -> Result<EncodedConfirmedTransactionWithStatusMeta, ChainError> {
        self.rpc
            .get_transaction(signature, UiTransactionEncoding::Json)
            .await
            .map_err(ChainError::from)
    }

    /// Signs the transaction with the owned key and submits it with preflight
    /// validation enabled, retrying failed submissions up to the configured
    /// attempt count with a fixed delay in between.
    pub async fn send_transaction(&self, mut transaction: Transaction) -> Result<Signature, ChainError> {
        let blockhash = transaction.message.recent_blockhash;
        transaction.sign(&[&self.keypair], blockhash);

        let rpc = self.rpc.clone();
        send_with_retry(self.max_send_retries, SEND_RETRY_DELAY, move || {
            let rpc = rpc.clone();
            let transaction = transaction.clone();
            async move {
                let config = RpcSendTransactionConfig {
                    skip_preflight: false,
                    preflight_commitment: Some(CommitmentConfig::confirmed().commitment),
                    ..RpcSendTransactionConfig::default()
                };
                rpc.send_transaction_with_config(&transaction, config).await
            }
        })
        .await
    }
}

/// Retries a submission future up to `max_retries` times with a fixed delay
/// between attempts. Returns the first successful signature, or
/// `ChainError::ExhaustedRetries` once every attempt has failed; which
/// attempt failed for what reason is not distinguishable to the caller.
pub(crate) async fn send_with_retry<F, Fut>(
    max_retries: usize,
    delay: Duration,
    mut attempt: F,
) -> Result<Signature, ChainError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Signature, ClientError>>,
{
    for attempt_index in 1..=max_retries {
        match attempt().await {
            Ok(signature) => {
                debug!(%signature, attempt = attempt_index, "transaction submitted");
                return Ok(signature);
            }
            Err(e) => {
                warn!(
                    error = %e,
                    attempt = attempt_index,
                    max_retries,
                    "transaction submission attempt failed"
                );
                if attempt_index < max_retries {
                    sleep(delay).await;
                }
            }
        }
    }
    Err(ChainError::ExhaustedRetries {
        attempts: max_retries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn transport_error() -> ClientError {
        ClientError::from(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "connection reset",
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn returns_signature_from_final_attempt() {
        let calls = Arc::new(AtomicUsize::new(0));
        let expected = Signature::new_unique();

        let counter = calls.clone();
        let result = send_with_retry(3, Duration::from_secs(1), move || {
            let counter = counter.clone();
            async move {
                let attempt = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 3 {
                    Err(transport_error())
                } else {
                    Ok(expected)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), expected);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_after_exactly_max_retries_attempts() {
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        let result = send_with_retry(3, Duration::from_secs(1), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<Signature, _>(transport_error())
            }
        })
        .await;

        assert!(matches!(
            result,
            Err(ChainError::ExhaustedRetries { attempts: 3 })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn transaction_lookup_surfaces_rpc_failures() {
        let mut server = mockito::Server::new_async().await;
        // The node does not know the signature; a null record cannot satisfy
        // the lookup and must surface as a transport error, not a panic
        let _mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"jsonrpc":"2.0","result":null,"id":1}"#)
            .create_async()
            .await;

        let client = ChainClient::new(&server.url(), Keypair::new(), 3);
        let result = client.get_transaction(&Signature::new_unique()).await;
        assert!(matches!(result, Err(ChainError::Transport(_))));
    }

    #[tokio::test]
    async fn balance_is_zero_on_rpc_failure() {
        let client = ChainClient::new("http://127.0.0.1:9", Keypair::new(), 3);
        assert_eq!(client.get_balance().await, 0);
    }

    #[tokio::test]
    async fn first_success_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let expected = Signature::new_unique();

        let counter = calls.clone();
        let result = send_with_retry(3, Duration::from_secs(1), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ClientError>(expected)
            }
        })
        .await;

        assert_eq!(result.unwrap(), expected);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
