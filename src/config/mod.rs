/// Environment-sourced runtime configuration

use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};

/// Raydium-style constant-product AMM program
const DEFAULT_AMM_PROGRAM_ID: &str = "675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8";
/// Raydium-style concentrated-liquidity program
const DEFAULT_CLMM_PROGRAM_ID: &str = "CAMMCzo5YL8w4VFF8KVHrK22GGUsp5VTaW7grrKgrWqK";
/// Pump.fun-style launchpad program
const DEFAULT_LAUNCHPAD_PROGRAM_ID: &str = "6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P";

/// Runtime settings, read once at startup. API base URLs are overridable so
/// integration tests can point clients at local fakes.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Chain RPC over HTTP
    pub rpc_http_url: String,
    /// Chain RPC over WebSocket, for log subscriptions
    pub rpc_ws_url: String,
    /// Program id monitored for AMM pool creations
    pub amm_program_id: String,
    /// Program id monitored for CLMM position openings
    pub clmm_program_id: String,
    /// Program id monitored for launchpad token creations and migrations
    pub launchpad_program_id: String,
    /// Whether discovered launches are sniped automatically
    pub auto_snipe: bool,
    /// Buy size per snipe, in SOL
    pub max_buy_amount_sol: f64,
    /// Slippage tolerance, in percent
    pub max_slippage_pct: f64,
    /// Minimum pool liquidity a candidate must show
    pub min_liquidity: f64,
    /// Declared switch for the rug check; not yet consulted by the analyzer
    pub check_rug: bool,
    /// Declared per-snipe timeout; not yet wired into any await point
    pub snipe_timeout_secs: u64,
    /// Submission attempts before a send is reported as failed
    pub send_max_retries: usize,
    /// Poll interval of the per-token price monitor, in seconds
    pub monitor_interval_secs: u64,
    /// Swap router (quote + swap-build) base URL
    pub jupiter_api_url: String,
    /// Market-data service base URL
    pub dexscreener_api_url: String,
    /// Price API base URL
    pub price_api_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rpc_http_url: "https://api.mainnet-beta.solana.com".to_string(),
            rpc_ws_url: "wss://api.mainnet-beta.solana.com".to_string(),
            amm_program_id: DEFAULT_AMM_PROGRAM_ID.to_string(),
            clmm_program_id: DEFAULT_CLMM_PROGRAM_ID.to_string(),
            launchpad_program_id: DEFAULT_LAUNCHPAD_PROGRAM_ID.to_string(),
            auto_snipe: false,
            max_buy_amount_sol: 50.0,
            max_slippage_pct: 100.0,
            min_liquidity: 1.0,
            check_rug: true,
            snipe_timeout_secs: 30,
            send_max_retries: 3,
            monitor_interval_secs: 10,
            jupiter_api_url: "https://quote-api.jup.ag/v6".to_string(),
            dexscreener_api_url: "https://api.dexscreener.com/latest/dex".to_string(),
            price_api_url: "https://price.jup.ag/v4".to_string(),
        }
    }
}

impl Settings {
    /// Builds settings from the environment, falling back to defaults for
    /// anything unset. Unparseable numeric values abort startup.
    pub fn from_env() -> Result<Self> {
        let defaults = Settings::default();
        Ok(Self {
            rpc_http_url: env_or("SOLANA_RPC_HTTP_URL", defaults.rpc_http_url),
            rpc_ws_url: env_or("SOLANA_RPC_WS_URL", defaults.rpc_ws_url),
            amm_program_id: env_or("AMM_PROGRAM_ID", defaults.amm_program_id),
            clmm_program_id: env_or("CLMM_PROGRAM_ID", defaults.clmm_program_id),
            launchpad_program_id: env_or("LAUNCHPAD_PROGRAM_ID", defaults.launchpad_program_id),
            auto_snipe: env_parse("AUTO_SNIPE", defaults.auto_snipe)?,
            max_buy_amount_sol: env_parse("MAX_BUY_AMOUNT", defaults.max_buy_amount_sol)?,
            max_slippage_pct: env_parse("MAX_SLIPPAGE", defaults.max_slippage_pct)?,
            min_liquidity: env_parse("MIN_LIQUIDITY", defaults.min_liquidity)?,
            check_rug: env_parse("CHECK_RUG", defaults.check_rug)?,
            snipe_timeout_secs: env_parse("SNIPE_TIMEOUT", defaults.snipe_timeout_secs)?,
            send_max_retries: env_parse("SEND_MAX_RETRIES", defaults.send_max_retries)?,
            monitor_interval_secs: env_parse("MONITOR_INTERVAL", defaults.monitor_interval_secs)?,
            jupiter_api_url: env_or("JUPITER_API_URL", defaults.jupiter_api_url),
            dexscreener_api_url: env_or("DEXSCREENER_API_URL", defaults.dexscreener_api_url),
            price_api_url: env_or("JUPITER_PRICE_API_URL", defaults.price_api_url),
        })
    }

    /// Slippage tolerance converted to basis points
    pub fn slippage_bps(&self) -> u64 {
        (self.max_slippage_pct * 100.0).round() as u64
    }

    /// Buy size converted to lamports
    pub fn buy_amount_lamports(&self) -> u64 {
        (self.max_buy_amount_sol * 1_000_000_000.0) as u64
    }
}

fn env_or(key: &str, default: String) -> String {
    env::var(key).unwrap_or(default)
}

fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slippage_converts_percent_to_basis_points() {
        let settings = Settings {
            max_slippage_pct: 1.5,
            ..Settings::default()
        };
        assert_eq!(settings.slippage_bps(), 150);
    }

    #[test]
    fn buy_amount_converts_sol_to_lamports() {
        let settings = Settings {
            max_buy_amount_sol: 0.25,
            ..Settings::default()
        };
        assert_eq!(settings.buy_amount_lamports(), 250_000_000);
    }

    #[test]
    fn defaults_monitor_all_three_program_families() {
        let settings = Settings::default();
        assert_ne!(settings.amm_program_id, settings.clmm_program_id);
        assert_ne!(settings.clmm_program_id, settings.launchpad_program_id);
        assert!(!settings.auto_snipe);
    }
}
