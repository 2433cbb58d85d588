use std::future::Future;

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::broadcast;
use tokio::time::{sleep, Duration};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use tracing::{debug, error, info, warn};
use url::Url;

/// Delay before resubscribing after a dropped stream. Fixed; no backoff
/// growth.
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// JSON-RPC response to the subscription request
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
    id: Option<u64>,
}

/// JSON-RPC error structure
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// logsNotification envelope
#[derive(Debug, Deserialize)]
struct LogsNotification {
    method: String,
    params: LogsNotificationParams,
}

#[derive(Debug, Deserialize)]
struct LogsNotificationParams {
    subscription: u64,
    result: LogsNotificationResult,
}

#[derive(Debug, Deserialize)]
struct LogsNotificationResult {
    value: LogBatch,
}

/// One transaction's worth of program logs
#[derive(Debug, Deserialize)]
struct LogBatch {
    signature: String,
    logs: Vec<String>,
}

/// Maintains a persistent log subscription for one program id.
///
/// Lifecycle: Disconnected -> Subscribing -> Subscribed -> Reconnecting ->
/// Subscribing, forever. Every I/O failure is recoverable: the loop logs it,
/// sleeps the fixed reconnect delay, and subscribes again. The only exit is
/// the shutdown channel.
pub struct LogSubscriber {
    ws_url: String,
    reconnect_delay: Duration,
}

impl LogSubscriber {
    pub fn new(ws_url: impl Into<String>) -> Self {
        Self {
            ws_url: ws_url.into(),
            reconnect_delay: RECONNECT_DELAY,
        }
    }

    /// Runs the subscription loop until shutdown.
    ///
    /// # Arguments
    /// * `program_id` - Program whose logs are subscribed to
    /// * `shutdown` - Broadcast channel ending the loop
    /// * `callback` - Invoked with `(log_lines, signature)` per notification
    pub async fn run<F, Fut>(
        &self,
        program_id: &str,
        mut shutdown: broadcast::Receiver<()>,
        callback: F,
    ) -> Result<()>
    where
        F: Fn(Vec<String>, String) -> Fut,
        Fut: Future<Output = ()>,
    {
        // Fail fast on an unusable endpoint instead of reconnect-looping on it
        Url::parse(&self.ws_url).context("invalid websocket url")?;

        loop {
            debug!(%program_id, url = %self.ws_url, "subscribing to program logs");
            tokio::select! {
                result = self.subscribe_and_consume(program_id, &callback) => {
                    match result {
                        Ok(()) => warn!(%program_id, "log stream closed, reconnecting"),
                        Err(e) => error!(%program_id, error = %e, "log stream failed, reconnecting"),
                    }
                }
                _ = shutdown.recv() => {
                    info!(%program_id, "log subscriber shutting down");
                    return Ok(());
                }
            }

            tokio::select! {
                _ = sleep(self.reconnect_delay) => {}
                _ = shutdown.recv() => {
                    info!(%program_id, "log subscriber shutting down");
                    return Ok(());
                }
            }
        }
    }

    /// One connect-subscribe-consume cycle. Returns when the stream ends;
    /// the caller decides whether to reconnect.
    async fn subscribe_and_consume<F, Fut>(&self, program_id: &str, callback: &F) -> Result<()>
    where
        F: Fn(Vec<String>, String) -> Fut,
        Fut: Future<Output = ()>,
    {
        let (ws_stream, response) = connect_async(self.ws_url.as_str())
            .await
            .context("failed to connect to log stream")?;
        debug!(status = %response.status(), "log stream connected");

        let (mut write, mut read) = ws_stream.split();

        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "logsSubscribe",
            "params": [
                { "mentions": [program_id] },
                { "commitment": "confirmed" }
            ]
        });
        write
            .send(Message::Text(request.to_string()))
            .await
            .context("failed to send logsSubscribe request")?;

        while let Some(message) = read.next().await {
            match message.context("log stream read error")? {
                Message::Text(text) => {
                    if let Some(batch) = handle_message(&text) {
                        callback(batch.logs, batch.signature).await;
                    }
                }
                Message::Ping(payload) => {
                    write
                        .send(Message::Pong(payload))
                        .await
                        .context("failed to answer ping")?;
                }
                Message::Close(frame) => {
                    info!(?frame, "log stream closed by server");
                    return Ok(());
                }
                _ => {}
            }
        }

        Ok(())
    }
}

/// Classifies an incoming text frame. Returns the log batch for
/// notifications; confirmations and errors are only logged.
fn handle_message(text: &str) -> Option<LogBatch> {
    if let Ok(notification) = serde_json::from_str::<LogsNotification>(text) {
        if notification.method == "logsNotification" {
            debug!(
                subscription = notification.params.subscription,
                signature = %notification.params.result.value.signature,
                "log notification received"
            );
            return Some(notification.params.result.value);
        }
        warn!(method = %notification.method, "unexpected notification method");
        return None;
    }

    if let Ok(response) = serde_json::from_str::<JsonRpcResponse>(text) {
        if let Some(error) = response.error {
            error!(code = error.code, message = %error.message, "subscription request rejected");
        } else if let Some(result) = response.result {
            info!(request_id = ?response.id, subscription = %result, "log subscription confirmed");
        }
        return None;
    }

    warn!("unparseable message on log stream");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_yields_log_batch() {
        let text = r#"{
            "jsonrpc": "2.0",
            "method": "logsNotification",
            "params": {
                "subscription": 42,
                "result": {
                    "context": { "slot": 123 },
                    "value": {
                        "signature": "5VERv8NMvzbJMEkV8xnrLkEaWRtSz9CosKDYjCJjBRnb",
                        "err": null,
                        "logs": ["Program log: initialize2", "Program log: init_pair"]
                    }
                }
            }
        }"#;
        let batch = handle_message(text).expect("notification should parse");
        assert_eq!(batch.logs.len(), 2);
        assert_eq!(batch.signature, "5VERv8NMvzbJMEkV8xnrLkEaWRtSz9CosKDYjCJjBRnb");
    }

    #[test]
    fn confirmation_yields_nothing() {
        let text = r#"{"jsonrpc":"2.0","result":42,"id":1}"#;
        assert!(handle_message(text).is_none());
    }

    #[test]
    fn rpc_error_yields_nothing() {
        let text = r#"{"jsonrpc":"2.0","error":{"code":-32602,"message":"bad params"},"id":1}"#;
        assert!(handle_message(text).is_none());
    }

    #[test]
    fn garbage_yields_nothing() {
        assert!(handle_message("pong").is_none());
    }
}
