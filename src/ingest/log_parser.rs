use chrono::Utc;
use regex::Regex;

use crate::core::types::{LaunchAction, LaunchEvent, ProgramFamily};

/// Heuristic decoder turning raw program log batches into typed launch
/// events, one decoding rule set per program family.
///
/// Matching is substring/pattern based rather than a structured instruction
/// decode; a batch that matches nothing yields an event with empty fields and
/// `LaunchAction::None`, never an error.
pub struct LogEventParser {
    mint_pattern: Regex,
    pool_pattern: Regex,
}

impl LogEventParser {
    pub fn new() -> Self {
        Self {
            mint_pattern: Regex::new(r"mint: (\w{32,44})").expect("invalid mint pattern"),
            pool_pattern: Regex::new(r"pool: (\w{32,44})").expect("invalid pool pattern"),
        }
    }

    /// Decode a raw log batch for the given program family
    pub fn decode(&self, family: ProgramFamily, logs: &[String], signature: &str) -> LaunchEvent {
        let joined = logs.join(" ");
        match family {
            ProgramFamily::Amm => self.decode_amm(&joined, signature),
            ProgramFamily::Clmm => self.decode_clmm(&joined, signature),
            ProgramFamily::LaunchPad => self.decode_launchpad(&joined, signature),
        }
    }

    /// AMM pools: capture mint and pool addresses; both initialization
    /// markers must be present before the batch counts as a pool creation.
    fn decode_amm(&self, joined: &str, signature: &str) -> LaunchEvent {
        let mut event = empty_event(ProgramFamily::Amm, signature);
        event.mint_address = self.capture(&self.mint_pattern, joined);
        event.secondary_address = self.capture(&self.pool_pattern, joined);
        if joined.contains("initialize2") && joined.contains("init_pair") {
            event.action = LaunchAction::PoolCreation;
        }
        event
    }

    /// CLMM pools: an opened position is the launch signal.
    fn decode_clmm(&self, joined: &str, signature: &str) -> LaunchEvent {
        let mut event = empty_event(ProgramFamily::Clmm, signature);
        if joined.contains("open_position") {
            event.action = LaunchAction::PositionOpened;
            event.mint_address = self.capture(&self.mint_pattern, joined);
        }
        event
    }

    /// Launchpad tokens: creation first, then the migration marker is
    /// checked so migration wins when both appear in the same batch.
    fn decode_launchpad(&self, joined: &str, signature: &str) -> LaunchEvent {
        let mut event = empty_event(ProgramFamily::LaunchPad, signature);
        if joined.contains("create") && joined.contains("token") {
            event.action = LaunchAction::TokenCreation;
            event.mint_address = self.capture(&self.mint_pattern, joined);
        }
        if joined.contains("init_launch") {
            event.action = LaunchAction::MigrationInitiated;
            event.mint_address = self.capture(&self.mint_pattern, joined);
        }
        event
    }

    fn capture(&self, pattern: &Regex, text: &str) -> Option<String> {
        pattern.captures(text).map(|captures| captures[1].to_string())
    }
}

impl Default for LogEventParser {
    fn default() -> Self {
        Self::new()
    }
}

fn empty_event(family: ProgramFamily, signature: &str) -> LaunchEvent {
    LaunchEvent {
        mint_address: None,
        secondary_address: None,
        program_family: family,
        action: LaunchAction::None,
        signature: signature.to_string(),
        observed_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINT: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";
    const POOL: &str = "58oQChx4yWmvKdwLLZzBi4ChoCc2fqCUWBkwMihLYQo2";

    fn logs(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|line| line.to_string()).collect()
    }

    #[test]
    fn amm_pool_creation_extracts_mint_and_pool() {
        let batch = logs(&[
            "Program log: initialize2",
            &format!("Program log: init_pair mint: {} pool: {}", MINT, POOL),
        ]);
        let event = LogEventParser::new().decode(ProgramFamily::Amm, &batch, "sig1");
        assert_eq!(event.action, LaunchAction::PoolCreation);
        assert_eq!(event.mint_address.as_deref(), Some(MINT));
        assert_eq!(event.secondary_address.as_deref(), Some(POOL));
        assert_eq!(event.signature, "sig1");
    }

    #[test]
    fn amm_without_both_markers_is_not_a_pool_creation() {
        let batch = logs(&[&format!("Program log: initialize2 mint: {}", MINT)]);
        let event = LogEventParser::new().decode(ProgramFamily::Amm, &batch, "sig2");
        assert_eq!(event.action, LaunchAction::None);
        assert_eq!(event.mint_address.as_deref(), Some(MINT));
    }

    #[test]
    fn clmm_open_position_is_decoded() {
        let batch = logs(&[&format!("Program log: open_position mint: {}", MINT)]);
        let event = LogEventParser::new().decode(ProgramFamily::Clmm, &batch, "sig3");
        assert_eq!(event.action, LaunchAction::PositionOpened);
        assert_eq!(event.mint_address.as_deref(), Some(MINT));
    }

    #[test]
    fn launchpad_migration_wins_over_token_creation() {
        let batch = logs(&[
            &format!("Program log: create token mint: {}", MINT),
            "Program log: init_launch",
        ]);
        let event = LogEventParser::new().decode(ProgramFamily::LaunchPad, &batch, "sig4");
        assert_eq!(event.action, LaunchAction::MigrationInitiated);
        assert_eq!(event.mint_address.as_deref(), Some(MINT));
    }

    #[test]
    fn launchpad_creation_without_migration_marker() {
        let batch = logs(&[&format!("Program log: create token mint: {}", MINT)]);
        let event = LogEventParser::new().decode(ProgramFamily::LaunchPad, &batch, "sig5");
        assert_eq!(event.action, LaunchAction::TokenCreation);
    }

    #[test]
    fn unmatched_logs_yield_empty_event() {
        let batch = logs(&["Program log: swap executed"]);
        let event = LogEventParser::new().decode(ProgramFamily::Amm, &batch, "sig6");
        assert_eq!(event.action, LaunchAction::None);
        assert!(event.mint_address.is_none());
        assert!(event.secondary_address.is_none());
    }

    #[test]
    fn short_addresses_are_not_captured() {
        let batch = logs(&["Program log: mint: tooshort"]);
        let event = LogEventParser::new().decode(ProgramFamily::Amm, &batch, "sig7");
        assert!(event.mint_address.is_none());
    }
}
