// crates/mooring-core/src/error.rs

use thiserror::Error;

/// Engine-wide error types for the Mooring staking engine.
///
/// Every error aborts the whole operation with no partial state change;
/// callers resubmit after satisfying the violated condition.
#[derive(Debug, Error)]
pub enum MooringError {
    /// Malformed input (zero address, zero or under-threshold amount,
    /// out-of-range commission or percentage, mismatched array lengths).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Caller lacks the required role.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Wrong lifecycle phase (already stop-listed, not registered under the
    /// claimed role, mismatched delegator/validator pairing, cap reached).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Claim or withdraw cooldown not yet elapsed, or vesting not yet ended.
    #[error("Too early: {0}")]
    TooEarly(String),

    /// Validator limit reached.
    #[error("Capacity exceeded: {0}")]
    Capacity(String),

    /// Fixed-reward reserve cannot cover a pending claim.
    #[error("Insufficient reserve: {0}")]
    InsufficientReserve(String),

    /// The host value-transfer primitive failed; fatal to the operation.
    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    /// Integer overflow in reward or pool arithmetic.
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),

    /// A guarded operation was re-entered during a value transfer.
    #[error("Reentrant call")]
    Reentrancy,

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for MooringError {
    fn from(e: serde_json::Error) -> Self {
        MooringError::Serialization(e.to_string())
    }
}
