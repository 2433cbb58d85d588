use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// On-chain program family whose logs are being monitored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProgramFamily {
    /// Constant-product AMM pools
    Amm,
    /// Concentrated-liquidity pools
    Clmm,
    /// Bonding-curve launchpad tokens
    LaunchPad,
}

impl ProgramFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgramFamily::Amm => "amm",
            ProgramFamily::Clmm => "clmm",
            ProgramFamily::LaunchPad => "launchpad",
        }
    }
}

impl std::fmt::Display for ProgramFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action decoded from a log batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaunchAction {
    /// A new AMM pool was initialized
    PoolCreation,
    /// A concentrated-liquidity position was opened
    PositionOpened,
    /// A launchpad token was created
    TokenCreation,
    /// A launchpad token started migrating to an AMM
    MigrationInitiated,
    /// Logs did not match any known launch pattern
    None,
}

/// Decoded signal that a new pool, position, or token was created or migrated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchEvent {
    /// Token mint address, when one could be extracted from the logs
    pub mint_address: Option<String>,
    /// Pool or position address, when present in the logs
    pub secondary_address: Option<String>,
    /// Program family the logs were emitted by
    pub program_family: ProgramFamily,
    /// What the log batch describes
    pub action: LaunchAction,
    /// Transaction signature the logs belong to
    pub signature: String,
    /// When the notification was received
    pub observed_at: DateTime<Utc>,
}

/// In-flight snipe registration, keyed by mint address
#[derive(Debug, Clone)]
pub struct PendingSnipe {
    /// Token mint address (registry key)
    pub mint_address: String,
    /// When the launch event was first seen
    pub discovered_at: DateTime<Utc>,
    /// Signature of the transaction that surfaced the launch
    pub signature: String,
    /// Program family the launch was decoded from
    pub program_family: ProgramFamily,
}

/// Liquidity lock status reported by the market-data service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockStatus {
    Locked,
    Unlocked,
    Unknown,
}

/// Risk verdict for a candidate mint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Token mint address the assessment is for
    pub mint_address: String,
    /// Whether the candidate passed the validity gate
    pub is_valid: bool,
    /// Whether a honeypot flag forced a rug verdict
    pub is_rug: bool,
    /// Pool liquidity as reported by the market-data service
    pub liquidity: f64,
    /// Nominal 0-10 scale, 10 worst; the scoring rules do not clamp it
    pub risk_score: i32,
    /// Liquidity lock status
    pub lock_status: LockStatus,
    /// Human-readable risk findings, in scoring order
    pub warnings: Vec<String>,
    /// Human-readable positive findings, in scoring order
    pub opportunities: Vec<String>,
}

/// Outcome of a dry-run transaction execution
#[derive(Debug, Clone, Default)]
pub struct SimulationResult {
    /// True iff the simulation reported no execution error
    pub success: bool,
    /// RPC or on-chain error, captured verbatim
    pub error: Option<String>,
    /// Execution logs returned by the simulation
    pub logs: Vec<String>,
    /// Compute units parsed from the logs; 0 when not reported
    pub units_consumed: u64,
}
