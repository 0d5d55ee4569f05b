// crates/mooring-ledger/src/queries.rs
//
// Read-only views over the committed state. Queries never mutate, never
// apply cooldown checks, and take an explicit `now` so callers can probe
// any point in time.

use serde::{Deserialize, Serialize};

use mooring_core::{Address, Amount, MooringError, Timestamp};

use crate::accrual;
use crate::engine::StakeEngine;
use crate::pools::PoolAccountant;
use crate::records::{AccountKind, DelegatorPosition, ValidatorRecord};
use crate::state::LifetimeTotals;

/// One row of a validator listing, with its pool breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorListing {
    pub address: Address,
    pub amount: Amount,
    pub delegated_amount: Amount,
    pub stopped_delegated_amount: Amount,
}

impl StakeEngine {
    pub fn is_validator(&self, addr: &Address) -> bool {
        self.state().kinds.get(addr) == Some(&AccountKind::Validator)
    }

    pub fn is_delegator(&self, addr: &Address) -> bool {
        self.state().kinds.get(addr) == Some(&AccountKind::Delegator)
    }

    /// A validator's accrued-unclaimed rewards as of `now`:
    /// `(fixed, variable)`.
    pub fn validator_earned(
        &self,
        validator: &Address,
        now: Timestamp,
    ) -> Result<(Amount, Amount), MooringError> {
        let v = self.state().validator(validator)?;
        let fixed = accrual::pending_validator_fixed(v, now)?;
        Ok((fixed, v.variable.variable_reward))
    }

    /// One position's accrued-unclaimed rewards as of `now`:
    /// `(fixed, variable)`, including the pending accumulator share.
    pub fn delegator_earned_per_validator(
        &self,
        delegator: &Address,
        validator: &Address,
        now: Timestamp,
    ) -> Result<(Amount, Amount), MooringError> {
        let v = self.state().validator(validator)?;
        let p = self.state().position(delegator, validator)?;
        accrual::pending_position_rewards(p, v.called_for_withdraw, v.delegators_acc, now)
    }

    /// A delegator's rewards summed across all its positions.
    pub fn delegator_earned_total(
        &self,
        delegator: &Address,
        now: Timestamp,
    ) -> Result<(Amount, Amount), MooringError> {
        let mut fixed: Amount = 0;
        let mut variable: Amount = 0;
        if let Some(validators) = self.state().delegated_to.get(delegator) {
            for validator in validators.iter() {
                let (f, v) = self.delegator_earned_per_validator(delegator, validator, now)?;
                fixed += f;
                variable += v;
            }
        }
        Ok((fixed, variable))
    }

    /// Listing of the active set with per-validator pool breakdowns.
    pub fn active_validators_listing(&self) -> Vec<ValidatorListing> {
        self.listing_of(self.state().active_validators.iter())
    }

    /// Listing of the stop-listed set with per-validator pool breakdowns.
    pub fn stopped_validators_listing(&self) -> Vec<ValidatorListing> {
        self.listing_of(self.state().stopped_validators.iter())
    }

    fn listing_of<'a>(&self, addrs: impl Iterator<Item = &'a Address>) -> Vec<ValidatorListing> {
        addrs
            .filter_map(|addr| {
                self.state().validators.get(addr).map(|v| ValidatorListing {
                    address: *addr,
                    amount: v.amount,
                    delegated_amount: v.delegated_amount,
                    stopped_delegated_amount: v.stopped_delegated_amount,
                })
            })
            .collect()
    }

    /// Full detail record for one validator.
    pub fn validator_info(&self, validator: &Address) -> Option<&ValidatorRecord> {
        self.state().validators.get(validator)
    }

    /// All of a delegator's positions, keyed by validator.
    pub fn delegator_info(&self, delegator: &Address) -> Vec<(Address, &DelegatorPosition)> {
        let Some(validators) = self.state().delegated_to.get(delegator) else {
            return Vec::new();
        };
        validators
            .iter()
            .filter_map(|v| {
                self.state()
                    .positions
                    .get(&(*delegator, *v))
                    .map(|p| (*v, p))
            })
            .collect()
    }

    /// The pool counters and fixed-reward reserve.
    pub fn pools(&self) -> &PoolAccountant {
        &self.state().pools
    }

    /// Exact lifetime distributed/claimed totals.
    pub fn totals(&self) -> &LifetimeTotals {
        &self.state().totals
    }

    /// Approximate total fixed reward ever accrued across the validator and
    /// delegator pools, projected to `now`. Reporting only — never used for
    /// per-account accounting.
    pub fn approximate_fixed_accrued(
        &self,
        now: Timestamp,
    ) -> Result<(Amount, Amount), MooringError> {
        let state = self.state();
        let validators = state.validators_accrual.projected(
            state.pools.active_validators,
            state.settings.validator.apr_bps,
            now,
        )?;
        let delegators = state.delegators_accrual.projected(
            state.pools.active_delegators,
            state.settings.delegator.apr_bps,
            now,
        )?;
        Ok((validators, delegators))
    }
}
