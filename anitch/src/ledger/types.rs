/// Lowest coherence value the ledger will ever hold
pub const COHERENCE_MIN: u8 = 0;
/// Highest coherence value the ledger will ever hold
pub const COHERENCE_MAX: u8 = 100;

/// Clamp an arbitrary signed amount into the coherence range.
pub fn clamp_coherence(value: i64) -> u8 {
    value.clamp(COHERENCE_MIN as i64, COHERENCE_MAX as i64) as u8
}

/// Record of one applied delta, kept for tracing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LedgerEntry {
    /// Delta that was requested
    pub requested: i32,
    /// Value before the delta
    pub before: u8,
    /// Value after clamping
    pub after: u8,
}

impl LedgerEntry {
    /// Amount that was actually applied after clamping
    pub fn applied(&self) -> i32 {
        self.after as i32 - self.before as i32
    }

    /// True when clamping swallowed part of the request
    pub fn was_clamped(&self) -> bool {
        self.applied() != self.requested
    }
}
