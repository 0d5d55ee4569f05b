// crates/mooring-ledger/src/state.rs
//
// LedgerState: the full mutable state of the engine, cloned at the start of
// every public operation and swapped back in only when the operation
// commits. All lookups funnel through the helpers here so lifecycle-phase
// errors read the same everywhere.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use mooring_core::{Address, Amount, MooringError, Timestamp};

use crate::accrual::GlobalAccrual;
use crate::pools::PoolAccountant;
use crate::records::{AccountKind, DelegatorPosition, ValidatorRecord};
use crate::sets::AddressSet;
use crate::settings::ProtocolSettings;

/// Exact lifetime totals, tracked alongside the approximate global accrual.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifetimeTotals {
    /// Sum of all amounts ever passed through the distribution engine.
    pub distributed: Amount,
    /// Fixed reward ever paid out or restaked.
    pub fixed_claimed: Amount,
    /// Variable reward ever paid out or restaked.
    pub variable_claimed: Amount,
}

/// The complete persistent state of the staking engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerState {
    pub settings: ProtocolSettings,
    pub pools: PoolAccountant,
    pub validators: HashMap<Address, ValidatorRecord>,
    /// Positions keyed by (delegator, validator).
    pub positions: HashMap<(Address, Address), DelegatorPosition>,
    /// Which staking role each known address occupies.
    pub kinds: HashMap<Address, AccountKind>,
    pub active_validators: AddressSet,
    pub stopped_validators: AddressSet,
    /// Per delegator, the validators it has an open position with.
    pub delegated_to: HashMap<Address, AddressSet>,
    /// Reporting-only approximate accrual across the validator pool.
    pub validators_accrual: GlobalAccrual,
    /// Reporting-only approximate accrual across the delegator pool.
    pub delegators_accrual: GlobalAccrual,
    pub totals: LifetimeTotals,
}

impl LedgerState {
    pub fn new(settings: ProtocolSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn validator(&self, addr: &Address) -> Result<&ValidatorRecord, MooringError> {
        self.validators.get(addr).ok_or_else(|| {
            MooringError::InvalidState(format!("{} is not a registered validator", addr))
        })
    }

    pub fn validator_mut(&mut self, addr: &Address) -> Result<&mut ValidatorRecord, MooringError> {
        self.validators.get_mut(addr).ok_or_else(|| {
            MooringError::InvalidState(format!("{} is not a registered validator", addr))
        })
    }

    pub fn position(
        &self,
        delegator: &Address,
        validator: &Address,
    ) -> Result<&DelegatorPosition, MooringError> {
        self.positions.get(&(*delegator, *validator)).ok_or_else(|| {
            MooringError::InvalidState(format!(
                "{} has no position with validator {}",
                delegator, validator
            ))
        })
    }

    pub fn position_mut(
        &mut self,
        delegator: &Address,
        validator: &Address,
    ) -> Result<&mut DelegatorPosition, MooringError> {
        self.positions
            .get_mut(&(*delegator, *validator))
            .ok_or_else(|| {
                MooringError::InvalidState(format!(
                    "{} has no position with validator {}",
                    delegator, validator
                ))
            })
    }

    /// Reject an address already occupying the other staking role.
    pub fn require_not_kind(
        &self,
        addr: &Address,
        forbidden: AccountKind,
    ) -> Result<(), MooringError> {
        if self.kinds.get(addr) == Some(&forbidden) {
            let as_what = match forbidden {
                AccountKind::Validator => "a validator",
                AccountKind::Delegator => "a delegator",
            };
            return Err(MooringError::InvalidState(format!(
                "{} is already registered as {}",
                addr, as_what
            )));
        }
        Ok(())
    }

    /// Drop a position and every membership referencing it. The validator's
    /// own delegator set is maintained by the caller, which usually holds a
    /// mutable borrow of the record already.
    pub fn erase_position(&mut self, delegator: &Address, validator: &Address) {
        self.positions.remove(&(*delegator, *validator));
        if let Some(set) = self.delegated_to.get_mut(delegator) {
            set.remove(validator);
            if set.is_empty() {
                self.delegated_to.remove(delegator);
                self.kinds.remove(delegator);
            }
        }
    }

    /// Advance both reporting-only accrual trackers to `now` against the
    /// current active pool totals and rates.
    pub fn touch_global_accrual(&mut self, now: Timestamp) -> Result<(), MooringError> {
        self.validators_accrual.advance(
            self.pools.active_validators,
            self.settings.validator.apr_bps,
            now,
        )?;
        self.delegators_accrual.advance(
            self.pools.active_delegators,
            self.settings.delegator.apr_bps,
            now,
        )?;
        Ok(())
    }

    /// Verify the global invariants against the per-entity sums. Test and
    /// debugging aid; operations never call this on the hot path.
    pub fn assert_consistent(&self) -> Result<(), MooringError> {
        let mut active_v = 0u128;
        let mut stopped_v = 0u128;
        for (addr, v) in &self.validators {
            let in_active = self.active_validators.contains(addr);
            let in_stopped = self.stopped_validators.contains(addr);
            if v.is_stopped() != in_stopped || v.is_stopped() == in_active {
                return Err(MooringError::InvalidState(format!(
                    "{} set membership disagrees with its stop flag",
                    addr
                )));
            }
            if v.is_stopped() {
                stopped_v += v.amount;
            } else {
                active_v += v.amount;
            }
            let positions_sum: Amount = v
                .delegators
                .iter()
                .filter_map(|d| self.positions.get(&(*d, *addr)))
                .map(|p| p.amount)
                .sum();
            if positions_sum != v.delegated_amount + v.stopped_delegated_amount {
                return Err(MooringError::InvalidState(format!(
                    "{} delegated sums diverge from its positions",
                    addr
                )));
            }
        }
        if active_v != self.pools.active_validators || stopped_v != self.pools.stopped_validators {
            return Err(MooringError::InvalidState(
                "validator pool counters diverge from record sums".to_string(),
            ));
        }
        let mut active_d = 0u128;
        let mut stopped_d = 0u128;
        for ((_, vaddr), p) in &self.positions {
            let stopped = p.is_stopped()
                || self
                    .validators
                    .get(vaddr)
                    .map(|v| v.is_stopped())
                    .unwrap_or(false);
            if stopped {
                stopped_d += p.amount;
            } else {
                active_d += p.amount;
            }
        }
        if active_d != self.pools.active_delegators || stopped_d != self.pools.stopped_delegators {
            return Err(MooringError::InvalidState(
                "delegator pool counters diverge from position sums".to_string(),
            ));
        }
        Ok(())
    }
}
