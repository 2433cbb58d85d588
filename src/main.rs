use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kestrel::config::Settings;
use kestrel::scout::analyzer::RiskGate;
use kestrel::scout::dexscreener::DexScreenerClient;
use kestrel::sniper::tracker::PendingSnipeTracker;
use kestrel::sniper::SniperBot;
use kestrel::strike::executor::SnipeExecutor;
use kestrel::strike::jupiter::JupiterClient;
use kestrel::strike::rpc::ChainClient;
use kestrel::strike::simulator::TransactionSimulator;
use kestrel::strike::wallet;
use kestrel::util::price_feed::PriceFeed;

fn init_tracing() -> Result<()> {
    // Create logs directory if it doesn't exist
    std::fs::create_dir_all("logs")?;

    // Create file appender for logs
    let file_appender = tracing_appender::rolling::daily("logs", "kestrel.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    // Create console layer with formatting
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_level(true)
        .compact();

    // Create file layer with JSON formatting
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .json()
        .with_current_span(false);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Leak the guard to prevent the file appender from being dropped
    std::mem::forget(guard);

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    info!("🦅 Kestrel Launch Sniper");
    info!("========================");

    let settings = Settings::from_env().context("failed to load configuration")?;

    // The only fatal startup path: nothing below can run without a signing key
    let keypair = wallet::load_keypair().context("failed to load wallet keypair")?;

    let (shutdown_tx, _) = broadcast::channel(16);

    let chain = Arc::new(ChainClient::new(
        &settings.rpc_http_url,
        keypair,
        settings.send_max_retries,
    ));
    let simulator = Arc::new(TransactionSimulator::new(chain.rpc_handle()));
    let jupiter = Arc::new(JupiterClient::new(settings.jupiter_api_url.clone()));
    let risk_gate = Arc::new(RiskGate::new(
        DexScreenerClient::new(settings.dexscreener_api_url.clone()),
        settings.min_liquidity,
    ));
    let tracker = Arc::new(PendingSnipeTracker::new());
    let executor = Arc::new(SnipeExecutor::new(
        jupiter,
        chain.clone(),
        simulator,
        tracker.clone(),
        settings.buy_amount_lamports(),
        settings.slippage_bps(),
    ));
    let price_feed = Arc::new(PriceFeed::new(settings.price_api_url.clone()));

    let balance = chain.get_balance_sol().await;
    info!(wallet = %chain.pubkey(), balance_sol = balance, "wallet ready");

    let auto_snipe = settings.auto_snipe;
    let bot = Arc::new(SniperBot::new(
        settings,
        chain,
        executor,
        risk_gate,
        tracker,
        price_feed,
        shutdown_tx.clone(),
    ));
    bot.set_auto_snipe(auto_snipe);

    let tasks = bot.start_monitoring();
    info!(tasks = tasks.len(), "✅ all monitoring services started");
    info!("Press Ctrl+C to shut down");

    match signal::ctrl_c().await {
        Ok(()) => info!("🛑 shutdown signal received"),
        Err(e) => error!(error = %e, "failed to listen for shutdown signal"),
    }

    // Stop the subscription loops and wait for them to drain
    let _ = shutdown_tx.send(());
    for (index, task) in tasks.into_iter().enumerate() {
        match task.await {
            Ok(()) => info!("✅ service {} shut down cleanly", index + 1),
            Err(e) => warn!("⚠️  service {} task failed: {}", index + 1, e),
        }
    }

    info!("👋 kestrel shutdown complete");
    Ok(())
}
