// crates/mooring-ledger/src/distribution.rs
//
// Distribution engine: splits externally supplied reward amounts between a
// validator and its delegator pool via the validator's commission, feeding
// the reward-per-share accumulator. A validator with no delegated principal
// absorbs the full amount. Excess attached value is refunded to the caller.

use mooring_core::{
    Address, Amount, HostEnv, MooringError, Role, RoleProvider, StakingEvent, PRECISION,
};

use crate::accrual;
use crate::engine::StakeEngine;

impl StakeEngine {
    /// Distribute `amounts[i]` to `validators[i]`, funded by `value` of
    /// attached native value. Requires the Distributor role. Returns the
    /// refunded excess.
    pub fn distribute_rewards(
        &mut self,
        host: &dyn HostEnv,
        roles: &dyn RoleProvider,
        caller: Address,
        validators: &[Address],
        amounts: &[Amount],
        value: Amount,
    ) -> Result<Amount, MooringError> {
        Self::require_role(roles, Role::Distributor, &caller)?;
        if validators.len() != amounts.len() {
            return Err(MooringError::Validation(format!(
                "{} validators but {} amounts",
                validators.len(),
                amounts.len()
            )));
        }
        let mut total: Amount = 0;
        for amount in amounts {
            total = total
                .checked_add(*amount)
                .ok_or_else(|| MooringError::Overflow("distribution total overflow".to_string()))?;
        }
        if value < total {
            return Err(MooringError::Validation(format!(
                "attached value of {} is below the distribution total of {}",
                value, total
            )));
        }
        self.transact(host.now(), |state, events| {
            for (target, amount) in validators.iter().zip(amounts) {
                if *amount == 0 {
                    continue;
                }
                // Paying an unregistered address would strand the funds, so
                // the whole batch aborts instead of skipping.
                let v = state.validator_mut(target)?;
                let mut delegator_share =
                    accrual::mul_div(*amount, PRECISION - Amount::from(v.commission_bps), PRECISION)?;
                let mut validator_share = *amount - delegator_share;
                let pool = v.total_delegated();
                if pool > 0 {
                    v.delegators_acc += accrual::acc_increment(delegator_share, pool)?;
                } else {
                    validator_share = *amount;
                    delegator_share = 0;
                }
                v.variable.variable_reward += validator_share;
                state.totals.distributed += *amount;
                events.push(StakingEvent::RewardsDistributed {
                    validator: *target,
                    validator_share,
                    delegator_share,
                });
            }
            let refund = value - total;
            if refund > 0 {
                host.transfer(caller, refund)?;
            }
            Ok(refund)
        })
    }
}
