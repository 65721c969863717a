/// Terminal result of a relay run that did not fail.
///
/// Failure terminal states (submission rejected, on-chain revert, confirmation
/// timeout) are error variants, see `models::error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// The on-chain value is fresh, or no eligible target exists. Expected
    /// steady-state outcome; the run performed no write.
    NoActionNeeded,
    /// The relay transaction was mined with a success status.
    Confirmed { tx_hash: String },
}
