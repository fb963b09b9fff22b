//! Coherence ledger - the only place the resource value is mutated

use tracing::debug;

use crate::ledger::types::{clamp_coherence, LedgerEntry, COHERENCE_MAX};

/// Bounded coherence value for one session
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoherenceLedger {
    value: u8,
}

impl CoherenceLedger {
    /// Create a ledger holding `initial`, clamped into range
    pub fn new(initial: i64) -> Self {
        Self {
            value: clamp_coherence(initial),
        }
    }

    /// A ledger at full coherence
    pub fn full() -> Self {
        Self {
            value: COHERENCE_MAX,
        }
    }

    /// Current coherence
    pub fn value(&self) -> u8 {
        self.value
    }

    /// Apply a signed delta and return the new clamped value. Never fails.
    pub fn apply(&mut self, delta: i32) -> u8 {
        self.apply_entry(delta).after
    }

    /// Apply a signed delta and return the full entry for the change
    pub fn apply_entry(&mut self, delta: i32) -> LedgerEntry {
        let before = self.value;
        let after = clamp_coherence(before as i64 + delta as i64);
        self.value = after;

        let entry = LedgerEntry {
            requested: delta,
            before,
            after,
        };
        if delta != 0 {
            debug!(
                requested = delta,
                before,
                after,
                clamped = entry.was_clamped(),
                "coherence delta applied"
            );
        }
        entry
    }

    /// Whether a cost (expressed as a negative delta) can be paid in full
    pub fn can_afford(&self, cost: i32) -> bool {
        self.value as i64 + cost as i64 >= 0
    }

    /// Points missing to pay `cost` in full; zero when affordable
    pub fn shortfall(&self, cost: i32) -> u8 {
        let missing = -(self.value as i64 + cost as i64);
        if missing > 0 {
            clamp_coherence(missing)
        } else {
            0
        }
    }
}

impl Default for CoherenceLedger {
    fn default() -> Self {
        Self::full()
    }
}
