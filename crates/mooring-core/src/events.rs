// crates/mooring-core/src/events.rs
//
// Discrete state-change notifications emitted by the engine for off-chain
// observers. Events carry addresses and amounts only and have no behavioral
// effect on the engine itself. They surface only when an operation commits.

use serde::{Deserialize, Serialize};

use crate::identity::Address;
use crate::types::{Amount, Timestamp};

/// A state-change notification emitted by a committed engine operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StakingEvent {
    /// A validator deposited principal (first deposit registers it).
    ValidatorDeposited {
        validator: Address,
        amount: Amount,
        commission_bps: u32,
    },
    /// The trusted intake deposited on behalf of a validator.
    DepositedForValidator {
        validator: Address,
        amount: Amount,
        vesting_end: Timestamp,
    },
    /// A delegator deposited toward a validator.
    DelegatorDeposited {
        delegator: Address,
        validator: Address,
        amount: Amount,
    },
    /// A validator claimed accrued rewards.
    ValidatorClaimed {
        validator: Address,
        fixed: Amount,
        variable: Amount,
    },
    /// A delegator claimed accrued rewards on one position.
    DelegatorClaimed {
        delegator: Address,
        validator: Address,
        fixed: Amount,
        variable: Amount,
    },
    /// A validator folded its accrued rewards back into principal.
    ValidatorRestaked { validator: Address, amount: Amount },
    /// A delegator folded accrued rewards back into one position.
    DelegatorRestaked {
        delegator: Address,
        validator: Address,
        amount: Amount,
    },
    /// A validator entered the stop list.
    ValidatorCalledForWithdraw { validator: Address, at: Timestamp },
    /// A delegator position entered the stop list.
    DelegatorCalledForWithdraw {
        delegator: Address,
        validator: Address,
        at: Timestamp,
    },
    /// A stop-listed validator returned to the active set.
    ValidatorRevived { validator: Address },
    /// A stop-listed position returned to the active pool.
    DelegatorRevived {
        delegator: Address,
        validator: Address,
    },
    /// A validator completed withdrawal; its record is erased.
    ValidatorWithdrawn {
        validator: Address,
        principal: Amount,
        fixed: Amount,
        variable: Amount,
    },
    /// A delegator position completed withdrawal; the position is erased.
    DelegatorWithdrawn {
        delegator: Address,
        validator: Address,
        principal: Amount,
        fixed: Amount,
        variable: Amount,
    },
    /// A validator was slashed, with the cascaded delegator total.
    Slashed {
        validator: Address,
        penalty: Amount,
        delegators_penalty: Amount,
    },
    /// Externally supplied rewards were distributed to a validator.
    RewardsDistributed {
        validator: Address,
        validator_share: Amount,
        delegator_share: Amount,
    },
    /// The fixed-reward reserve was funded.
    ReserveFunded { from: Address, amount: Amount },
    /// Excess fixed-reward reserve was swept by the administrator.
    ReserveSwept { to: Address, amount: Amount },
}
