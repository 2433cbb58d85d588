use anyhow::{bail, Context, Result};
use solana_sdk::signature::{Keypair, Signer};
use tracing::{debug, info};

/// Environment variable holding the wallet private key
pub const WALLET_KEY_ENV: &str = "WALLET_PRIVATE_KEY";

/// Loads the signing keypair from the environment. Accepts a base58 string
/// (CLI export format) or a JSON byte array (keypair file format).
///
/// The only fatal startup path: any failure here aborts the process.
pub fn load_keypair() -> Result<Keypair> {
    let raw = std::env::var(WALLET_KEY_ENV)
        .with_context(|| format!("{} not set; the bot cannot sign without a wallet", WALLET_KEY_ENV))?;
    let keypair = parse_keypair(&raw)?;
    info!(pubkey = %keypair.pubkey(), "wallet keypair loaded");
    Ok(keypair)
}

/// Parses key material in either supported format
fn parse_keypair(raw: &str) -> Result<Keypair> {
    // Try base58 first (Solana CLI format)
    if let Ok(bytes) = bs58::decode(raw.trim()).into_vec() {
        if bytes.len() == 64 {
            debug!("parsing wallet key as base58");
            return Keypair::from_bytes(&bytes)
                .context("failed to build keypair from base58 key material");
        }
    }

    // Try JSON array format
    if let Ok(json_bytes) = serde_json::from_str::<Vec<u8>>(raw) {
        if json_bytes.len() == 64 {
            debug!("parsing wallet key as JSON byte array");
            return Keypair::from_bytes(&json_bytes)
                .context("failed to build keypair from JSON key material");
        }
    }

    bail!("invalid wallet key format; expected base58 or a 64-byte JSON array")
}
