use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::core::types::{PendingSnipe, ProgramFamily};

/// In-memory registry of mints with a pipeline in flight. The atomic
/// check-and-insert is the only dedup gate: two launch events for the same
/// mint arriving back-to-back cannot both claim it.
#[derive(Debug, Default)]
pub struct PendingSnipeTracker {
    entries: DashMap<String, PendingSnipe>,
}

impl PendingSnipeTracker {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Claims a mint for processing. Returns false when the mint already has
    /// a pipeline in flight.
    pub fn try_add(&self, mint_address: &str, signature: &str, program_family: ProgramFamily) -> bool {
        match self.entries.entry(mint_address.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(PendingSnipe {
                    mint_address: mint_address.to_string(),
                    discovered_at: Utc::now(),
                    signature: signature.to_string(),
                    program_family,
                });
                true
            }
        }
    }

    /// Releases a mint. A no-op when the mint is not registered.
    pub fn remove(&self, mint_address: &str) {
        self.entries.remove(mint_address);
    }

    pub fn contains(&self, mint_address: &str) -> bool {
        self.entries.contains_key(mint_address)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINT: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

    #[test]
    fn first_insertion_wins() {
        let tracker = PendingSnipeTracker::new();
        assert!(tracker.try_add(MINT, "sig1", ProgramFamily::Amm));
        assert!(!tracker.try_add(MINT, "sig2", ProgramFamily::Amm));
        assert!(!tracker.try_add(MINT, "sig3", ProgramFamily::LaunchPad));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn removal_allows_reprocessing() {
        let tracker = PendingSnipeTracker::new();
        assert!(tracker.try_add(MINT, "sig1", ProgramFamily::Amm));
        tracker.remove(MINT);
        assert!(!tracker.contains(MINT));
        assert!(tracker.try_add(MINT, "sig2", ProgramFamily::Amm));
    }

    #[test]
    fn removing_an_unknown_mint_is_a_no_op() {
        let tracker = PendingSnipeTracker::new();
        tracker.remove(MINT);
        assert!(tracker.is_empty());
    }

    #[test]
    fn concurrent_claims_admit_exactly_one_winner() {
        use std::sync::Arc;

        let tracker = Arc::new(PendingSnipeTracker::new());
        let mut handles = Vec::new();
        for i in 0..16 {
            let tracker = tracker.clone();
            handles.push(std::thread::spawn(move || {
                tracker.try_add(MINT, &format!("sig{}", i), ProgramFamily::Amm)
            }));
        }
        let winners = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        assert_eq!(tracker.len(), 1);
    }
}
