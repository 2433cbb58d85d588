/// Risk gating for launch candidates, backed by market-data pair lookups

use tracing::{debug, warn};

use crate::core::error::MarketDataError;
use crate::core::types::{LockStatus, RiskAssessment};

use super::dexscreener::{DexScreenerClient, TokenPair};

/// Worst score on the nominal 0-10 scale; every candidate starts here
const BASE_RISK_SCORE: i32 = 10;
/// Scores at or below this pass the validity gate
const MAX_ACCEPTABLE_RISK: i32 = 6;

/// Computes a fresh validity/rug verdict per candidate mint. Nothing is
/// cached; launches move too fast for stale pair data to be useful.
pub struct RiskGate {
    dexscreener: DexScreenerClient,
    min_liquidity: f64,
}

impl RiskGate {
    pub fn new(dexscreener: DexScreenerClient, min_liquidity: f64) -> Self {
        Self {
            dexscreener,
            min_liquidity,
        }
    }

    /// Assess a candidate mint. Never fails: market-data errors produce an
    /// invalid assessment carrying the failure as a warning.
    pub async fn assess(&self, mint_address: &str) -> RiskAssessment {
        match self.dexscreener.get_token_pairs(mint_address).await {
            Ok(pairs) => {
                let assessment = self.score_pair(mint_address, &pairs[0]);
                debug!(
                    mint = %mint_address,
                    risk_score = assessment.risk_score,
                    liquidity = assessment.liquidity,
                    is_valid = assessment.is_valid,
                    "candidate scored"
                );
                assessment
            }
            Err(MarketDataError::NotFound) => {
                let mut assessment = empty_assessment(mint_address);
                assessment
                    .warnings
                    .push("Token not found on DexScreener".to_string());
                assessment
            }
            Err(e) => {
                warn!(mint = %mint_address, error = %e, "market-data lookup failed");
                let mut assessment = empty_assessment(mint_address);
                assessment
                    .warnings
                    .push(format!("Market data lookup failed: {}", e));
                assessment
            }
        }
    }

    /// Applies the scoring rules to one pair. The arithmetic is deliberately
    /// unclamped; see DESIGN.md for the open question it preserves.
    fn score_pair(&self, mint_address: &str, pair: &TokenPair) -> RiskAssessment {
        let mut assessment = empty_assessment(mint_address);

        let liquidity = pair
            .liquidity
            .as_ref()
            .and_then(|liquidity| liquidity.usd)
            .unwrap_or(0.0);
        assessment.liquidity = liquidity;

        if liquidity < self.min_liquidity {
            assessment
                .warnings
                .push(format!("Low liquidity: ${:.2}", liquidity));
            assessment.risk_score += 2;
        }

        let locked = pair
            .liquidity
            .as_ref()
            .and_then(|liquidity| liquidity.lock.as_ref())
            .and_then(|lock| lock.locked)
            .unwrap_or(false);
        if locked {
            assessment.lock_status = LockStatus::Locked;
            assessment
                .opportunities
                .push("Liquidity is locked".to_string());
            assessment.risk_score -= 2;
        } else {
            assessment.lock_status = LockStatus::Unlocked;
            assessment.warnings.push("Liquidity not locked".to_string());
            assessment.risk_score += 3;
        }

        // Honeypot overrides everything scored so far
        if pair.honeypot.unwrap_or(false) {
            assessment.is_rug = true;
            assessment
                .warnings
                .push("Potential honeypot detected".to_string());
            assessment.risk_score = BASE_RISK_SCORE;
        }

        assessment.is_valid =
            passes_threshold(assessment.risk_score, liquidity, self.min_liquidity);
        assessment
    }
}

/// Validity gate shared by the scoring path and its boundary tests
fn passes_threshold(risk_score: i32, liquidity: f64, min_liquidity: f64) -> bool {
    risk_score <= MAX_ACCEPTABLE_RISK && liquidity >= min_liquidity
}

fn empty_assessment(mint_address: &str) -> RiskAssessment {
    RiskAssessment {
        mint_address: mint_address.to_string(),
        is_valid: false,
        is_rug: false,
        liquidity: 0.0,
        risk_score: BASE_RISK_SCORE,
        lock_status: LockStatus::Unknown,
        warnings: Vec::new(),
        opportunities: Vec::new(),
    }
}
