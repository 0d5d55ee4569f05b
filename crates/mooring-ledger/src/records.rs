// crates/mooring-ledger/src/records.rs
//
// Per-entity data model: validator records, delegator positions, and their
// reward/penalty sub-states. Records are created on first deposit and erased
// entirely on final withdrawal.

use serde::{Deserialize, Serialize};

use mooring_core::{Address, Amount, Bps, Timestamp};

use crate::sets::AddressSet;

/// Which staking role an address currently occupies. An address holds at
/// most one; a validator cannot delegate and a delegator cannot validate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountKind {
    Validator,
    Delegator,
}

/// Time-proportional fixed-reward accrual state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedRewardState {
    /// APR snapshot in force since the last checkpoint (bps).
    pub apr_bps: Bps,
    /// Left boundary of the open accrual sub-period.
    pub last_update: Timestamp,
    /// Accrued, unclaimed fixed reward.
    pub fixed_reward: Amount,
    /// Lifetime fixed reward claimed.
    pub total_claimed: Amount,
}

/// Pool-share variable-reward state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableRewardState {
    /// Accrued, unclaimed variable reward.
    pub variable_reward: Amount,
    /// Lifetime variable reward claimed.
    pub total_claimed: Amount,
}

/// Slashing bookkeeping for a validator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyState {
    /// Timestamp of the most recent slash; zero if never slashed.
    pub last_slash: Timestamp,
    /// Would-have-earned fixed reward accumulated since the last slash,
    /// pending subtraction at the next one.
    pub potential_penalty: Amount,
}

/// Everything the engine tracks for one validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorRecord {
    /// Own principal.
    pub amount: Amount,
    /// Commission in bps. Set once at first deposit, immutable thereafter.
    pub commission_bps: Bps,
    /// Timestamp of the last reward claim.
    pub last_claim: Timestamp,
    /// Zero while active; the stop-list entry timestamp once the validator
    /// has called for withdraw.
    pub called_for_withdraw: Timestamp,
    /// Earliest permitted withdrawal time for principal deposited through
    /// the trusted swap path; zero otherwise.
    pub vesting_end: Timestamp,
    pub fixed: FixedRewardState,
    pub variable: VariableRewardState,
    pub penalty: PenaltyState,
    /// Principal sum of positions classified as actively delegated.
    pub delegated_amount: Amount,
    /// Principal sum of positions classified as stop-listed.
    pub stopped_delegated_amount: Amount,
    /// Scaled reward-per-share accumulator for the delegator pool.
    /// Monotonically non-decreasing.
    pub delegators_acc: Amount,
    /// Addresses with an open position against this validator.
    pub delegators: AddressSet,
}

impl ValidatorRecord {
    pub fn new(commission_bps: Bps, apr_bps: Bps, now: Timestamp) -> Self {
        Self {
            amount: 0,
            commission_bps,
            last_claim: now,
            called_for_withdraw: 0,
            vesting_end: 0,
            fixed: FixedRewardState {
                apr_bps,
                last_update: now,
                fixed_reward: 0,
                total_claimed: 0,
            },
            variable: VariableRewardState::default(),
            penalty: PenaltyState::default(),
            delegated_amount: 0,
            stopped_delegated_amount: 0,
            delegators_acc: 0,
            delegators: AddressSet::new(),
        }
    }

    /// Whether the validator is in the stop list.
    pub fn is_stopped(&self) -> bool {
        self.called_for_withdraw > 0
    }

    /// Active plus stopped delegated principal; the accumulator denominator.
    pub fn total_delegated(&self) -> Amount {
        self.delegated_amount + self.stopped_delegated_amount
    }
}

/// One delegator's position against one validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegatorPosition {
    /// Position principal.
    pub amount: Amount,
    /// Last-seen copy of the validator's `delegators_acc`.
    pub stored_acc: Amount,
    /// Zero while active; the position's own stop timestamp otherwise.
    pub called_for_withdraw: Timestamp,
    /// Timestamp of the last reward claim on this position.
    pub last_claim: Timestamp,
    pub fixed: FixedRewardState,
    pub variable: VariableRewardState,
}

impl DelegatorPosition {
    pub fn new(stored_acc: Amount, apr_bps: Bps, now: Timestamp) -> Self {
        Self {
            amount: 0,
            stored_acc,
            called_for_withdraw: 0,
            last_claim: now,
            fixed: FixedRewardState {
                apr_bps,
                last_update: now,
                fixed_reward: 0,
                total_claimed: 0,
            },
            variable: VariableRewardState::default(),
        }
    }

    /// Whether this position has personally called for withdraw.
    pub fn is_stopped(&self) -> bool {
        self.called_for_withdraw > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validator_record() {
        let v = ValidatorRecord::new(1_500, 1_500, 1_000);
        assert_eq!(v.amount, 0);
        assert!(!v.is_stopped());
        assert_eq!(v.fixed.last_update, 1_000);
        assert_eq!(v.last_claim, 1_000);
        assert_eq!(v.total_delegated(), 0);
    }

    #[test]
    fn test_stopped_flag_tracks_timestamp() {
        let mut v = ValidatorRecord::new(1_500, 1_500, 1_000);
        v.called_for_withdraw = 2_000;
        assert!(v.is_stopped());
    }

    #[test]
    fn test_new_position_snapshots_acc() {
        let p = DelegatorPosition::new(42, 1_300, 500);
        assert_eq!(p.stored_acc, 42);
        assert_eq!(p.fixed.apr_bps, 1_300);
        assert!(!p.is_stopped());
    }
}
