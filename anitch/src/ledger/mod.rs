//! Coherence Ledger
//!
//! Coherence is the single depletable resource of a session. It lives in
//! `[0, 100]`; every mutation goes through [`CoherenceLedger::apply`], which
//! clamps instead of failing. Costs are expressed as negative deltas, so an
//! action costing 15 points is checked with `can_afford(-15)`.
//!
//! ```rust
//! use anitch::ledger::CoherenceLedger;
//!
//! let mut ledger = CoherenceLedger::full();
//! assert!(ledger.can_afford(-15));
//! assert_eq!(ledger.apply(-15), 85);
//! assert_eq!(ledger.apply(500), 100);
//! ```

mod coherence;
mod types;

pub use coherence::CoherenceLedger;
pub use types::{clamp_coherence, LedgerEntry, COHERENCE_MAX, COHERENCE_MIN};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ledger_starts_full() {
        let ledger = CoherenceLedger::default();
        assert_eq!(ledger.value(), 100);
    }

    #[test]
    fn test_ledger_clamps_initial_value() {
        assert_eq!(CoherenceLedger::new(250).value(), 100);
        assert_eq!(CoherenceLedger::new(-3).value(), 0);
    }

    #[test]
    fn test_apply_clamps_at_bounds() {
        let mut ledger = CoherenceLedger::new(10);
        assert_eq!(ledger.apply(-25), 0);
        assert_eq!(ledger.apply(130), 100);
        assert_eq!(ledger.apply(2), 100);
    }

    #[test]
    fn test_entry_reports_clamping() {
        let mut ledger = CoherenceLedger::new(4);
        let entry = ledger.apply_entry(-5);
        assert_eq!(entry.before, 4);
        assert_eq!(entry.after, 0);
        assert_eq!(entry.applied(), -4);
        assert!(entry.was_clamped());
    }

    #[test]
    fn test_can_afford_is_inclusive() {
        let ledger = CoherenceLedger::new(15);
        assert!(ledger.can_afford(-15));
        assert!(!ledger.can_afford(-16));
        assert_eq!(ledger.shortfall(-20), 5);
        assert_eq!(ledger.shortfall(-10), 0);
    }

    proptest! {
        #[test]
        fn prop_apply_stays_in_range(start in -50i64..200, deltas in proptest::collection::vec(-300i32..300, 0..32)) {
            let mut ledger = CoherenceLedger::new(start);
            for delta in deltas {
                let value = ledger.apply(delta);
                prop_assert!(value <= COHERENCE_MAX);
                prop_assert_eq!(value, ledger.value());
            }
        }

        #[test]
        fn prop_can_afford_matches_shortfall(start in 0i64..=100, cost in -120i32..=0) {
            let ledger = CoherenceLedger::new(start);
            prop_assert_eq!(ledger.can_afford(cost), ledger.shortfall(cost) == 0);
        }
    }
}
