pub mod tracker;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use solana_sdk::signature::Signature;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use crate::config::Settings;
use crate::core::error::SnipeError;
use crate::core::types::{LaunchAction, LaunchEvent, ProgramFamily};
use crate::ingest::log_parser::LogEventParser;
use crate::ingest::subscriber::LogSubscriber;
use crate::scout::analyzer::RiskGate;
use crate::strike::executor::SnipeExecutor;
use crate::strike::rpc::ChainClient;
use crate::util::price_feed::PriceFeed;
use tracker::PendingSnipeTracker;

/// Price move fraction that triggers a monitor alert
const PRICE_ALERT_THRESHOLD: f64 = 0.05;

/// Per-token price monitor bookkeeping
#[derive(Debug, Clone)]
struct MonitoredToken {
    last_price: f64,
    started_at: DateTime<Utc>,
}

/// Top-level sniping service. Owns the dedup tracker and the monitored-token
/// registry, spawns one log subscription task per program family, and routes
/// decoded launch events through the risk gate into the execution pipeline.
pub struct SniperBot {
    settings: Settings,
    chain: Arc<ChainClient>,
    executor: Arc<SnipeExecutor>,
    risk_gate: Arc<RiskGate>,
    tracker: Arc<PendingSnipeTracker>,
    parser: LogEventParser,
    price_feed: Arc<PriceFeed>,
    monitored_tokens: Arc<DashMap<String, MonitoredToken>>,
    auto_snipe_enabled: AtomicBool,
    shutdown_tx: broadcast::Sender<()>,
}

impl SniperBot {
    pub fn new(
        settings: Settings,
        chain: Arc<ChainClient>,
        executor: Arc<SnipeExecutor>,
        risk_gate: Arc<RiskGate>,
        tracker: Arc<PendingSnipeTracker>,
        price_feed: Arc<PriceFeed>,
        shutdown_tx: broadcast::Sender<()>,
    ) -> Self {
        Self {
            settings,
            chain,
            executor,
            risk_gate,
            tracker,
            parser: LogEventParser::new(),
            price_feed,
            monitored_tokens: Arc::new(DashMap::new()),
            auto_snipe_enabled: AtomicBool::new(false),
            shutdown_tx,
        }
    }

    pub fn set_auto_snipe(&self, enabled: bool) {
        self.auto_snipe_enabled.store(enabled, Ordering::SeqCst);
        info!(enabled, "auto-snipe toggled");
    }

    pub fn auto_snipe_enabled(&self) -> bool {
        self.auto_snipe_enabled.load(Ordering::SeqCst)
    }

    /// Spawns one log subscription task per program family. The returned
    /// handles are joined by the orchestrator during shutdown.
    #[instrument(skip(self))]
    pub fn start_monitoring(self: &Arc<Self>) -> Vec<JoinHandle<()>> {
        let programs = [
            (ProgramFamily::Amm, self.settings.amm_program_id.clone()),
            (ProgramFamily::Clmm, self.settings.clmm_program_id.clone()),
            (
                ProgramFamily::LaunchPad,
                self.settings.launchpad_program_id.clone(),
            ),
        ];

        programs
            .into_iter()
            .map(|(family, program_id)| {
                let bot = Arc::clone(self);
                let shutdown = self.shutdown_tx.subscribe();
                tokio::spawn(async move {
                    info!(%program_id, %family, "📡 monitoring program logs");
                    let subscriber = LogSubscriber::new(bot.settings.rpc_ws_url.clone());
                    let handler = &bot;
                    let result = subscriber
                        .run(&program_id, shutdown, |logs, signature| async move {
                            handler.handle_log_batch(family, logs, signature).await;
                        })
                        .await;
                    if let Err(e) = result {
                        error!(%program_id, error = %e, "log monitoring task ended with error");
                    }
                })
            })
            .collect()
    }

    /// Decodes a log batch and runs the auto-snipe flow for launch events:
    /// dedup claim, risk gate, then the execution pipeline in its own task.
    async fn handle_log_batch(&self, family: ProgramFamily, logs: Vec<String>, signature: String) {
        if !self.auto_snipe_enabled() {
            return;
        }

        let event = self.parser.decode(family, &logs, &signature);
        if !is_launch(&event) {
            return;
        }
        let Some(mint) = event.mint_address.clone() else {
            return;
        };

        if !self.tracker.try_add(&mint, &event.signature, family) {
            debug!(%mint, "duplicate launch event ignored");
            return;
        }

        info!(%mint, action = ?event.action, %family, "🚀 launch candidate discovered");

        let assessment = self.risk_gate.assess(&mint).await;
        if assessment.is_valid && !assessment.is_rug {
            info!(
                %mint,
                risk_score = assessment.risk_score,
                liquidity = assessment.liquidity,
                "✅ candidate passed risk gate"
            );
            let executor = self.executor.clone();
            tokio::spawn(async move {
                // Outcome is logged by the executor; the auto path has no caller
                let _ = executor.snipe(&mint).await;
            });
        } else {
            warn!(
                %mint,
                risk_score = assessment.risk_score,
                warnings = ?assessment.warnings,
                "❌ candidate rejected by risk gate"
            );
            self.tracker.remove(&mint);
        }
    }

    /// Snipe a token on behalf of an operator; the outcome is returned for
    /// reporting back to the caller.
    pub async fn manual_snipe(&self, mint_address: &str) -> Result<Signature, SnipeError> {
        info!(mint = %mint_address, "manual snipe requested");
        self.executor.snipe(mint_address).await
    }

    /// Wallet balance in SOL, for status reporting
    pub async fn balance_sol(&self) -> f64 {
        self.chain.get_balance_sol().await
    }

    pub fn pending_snipe_count(&self) -> usize {
        self.tracker.len()
    }

    pub fn monitored_token_count(&self) -> usize {
        self.monitored_tokens.len()
    }

    /// Starts a background price watcher for a token. Returns false when the
    /// token is already being monitored.
    pub fn monitor_token(self: &Arc<Self>, mint_address: &str) -> bool {
        match self.monitored_tokens.entry(mint_address.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(MonitoredToken {
                    last_price: 0.0,
                    started_at: Utc::now(),
                });
                let bot = Arc::clone(self);
                let mint = mint_address.to_string();
                let shutdown = self.shutdown_tx.subscribe();
                tokio::spawn(async move {
                    bot.watch_token_price(mint, shutdown).await;
                });
                true
            }
        }
    }

    /// Stops the watcher for a token; its loop exits on the next tick.
    pub fn stop_monitoring_token(&self, mint_address: &str) {
        self.monitored_tokens.remove(mint_address);
    }

    async fn watch_token_price(&self, mint: String, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker =
            tokio::time::interval(Duration::from_secs(self.settings.monitor_interval_secs));
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.recv() => {
                    self.monitored_tokens.remove(&mint);
                    return;
                }
            }

            let Some(started_at) = self
                .monitored_tokens
                .get(&mint)
                .map(|entry| entry.started_at)
            else {
                // Unregistered while we slept
                return;
            };

            match self.price_feed.get_token_price(&mint).await {
                Ok(price) => {
                    if let Some(mut entry) = self.monitored_tokens.get_mut(&mint) {
                        let last = entry.last_price;
                        if last > 0.0 {
                            let change = (price - last) / last;
                            if change.abs() > PRICE_ALERT_THRESHOLD {
                                info!(
                                    %mint,
                                    price,
                                    change_pct = change * 100.0,
                                    monitored_since = %started_at,
                                    "📈 price alert"
                                );
                            }
                        }
                        entry.last_price = price;
                    }
                }
                Err(e) => warn!(%mint, error = %e, "price lookup failed"),
            }
        }
    }
}

/// A decoded event counts as a launch when any recognized action matched
fn is_launch(event: &LaunchEvent) -> bool {
    !matches!(event.action, LaunchAction::None)
}
