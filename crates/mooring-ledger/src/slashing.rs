// crates/mooring-ledger/src/slashing.rs
//
// Slashing engine: penalizes a batch of validators and cascades
// proportional penalties to their delegators, routing the summed proceeds
// to the configured receiver in a single transfer.
//
// The penalty per validator is min(principal, to_slash + potential_penalty)
// where potential_penalty re-accumulates the reward the validator would
// have earned since its previous slash, so a repeat offender cannot bank
// full APR between slashes.

use mooring_core::{Address, Amount, HostEnv, MooringError, Role, RoleProvider, StakingEvent};
use mooring_core::PRECISION;

use crate::accrual;
use crate::engine::StakeEngine;
use crate::pools;

impl StakeEngine {
    /// Slash every registered validator in `targets`. Unregistered addresses
    /// are skipped; any condition that would corrupt invariants aborts the
    /// whole batch. Requires the Distributor role.
    pub fn slash(
        &mut self,
        host: &dyn HostEnv,
        roles: &dyn RoleProvider,
        caller: Address,
        targets: &[Address],
    ) -> Result<Amount, MooringError> {
        Self::require_role(roles, Role::Distributor, &caller)?;
        self.transact(host.now(), |state, events| {
            let now = host.now();
            let validator_settings = state.settings.validator.clone();
            let delegator_settings = state.settings.delegator.clone();
            let receiver = state.settings.slash_receiver;
            let delegator_bps = delegator_settings.to_slash;
            let mut batch_total: Amount = 0;

            for target in targets {
                if !state.validators.contains_key(target) {
                    tracing::debug!(%target, "slash target is not a validator, skipping");
                    continue;
                }
                let v = state.validator_mut(target)?;
                accrual::checkpoint_validator(v, &validator_settings, now)?;
                let penalty = v
                    .amount
                    .min(validator_settings.to_slash + v.penalty.potential_penalty);
                v.amount -= penalty;
                v.penalty.potential_penalty = 0;
                v.penalty.last_slash = now;

                let was_stopped = v.is_stopped();
                let mut forced_stop = false;
                if was_stopped {
                    pools::sub(&mut state.pools.stopped_validators, penalty)?;
                } else {
                    pools::sub(&mut state.pools.active_validators, penalty)?;
                    let v = state.validator_mut(target)?;
                    if v.amount < validator_settings.minimum_threshold {
                        // Forced exit: the remaining principal and the whole
                        // delegated pool move to the stopped side.
                        forced_stop = true;
                        v.called_for_withdraw = now;
                        let own = v.amount;
                        let delegated = v.delegated_amount;
                        v.stopped_delegated_amount += delegated;
                        v.delegated_amount = 0;
                        pools::sub(&mut state.pools.active_validators, own)?;
                        pools::add(&mut state.pools.stopped_validators, own)?;
                        pools::sub(&mut state.pools.active_delegators, delegated)?;
                        pools::add(&mut state.pools.stopped_delegators, delegated)?;
                        state.active_validators.remove(target);
                        state.stopped_validators.insert(*target);
                        events.push(StakingEvent::ValidatorCalledForWithdraw {
                            validator: *target,
                            at: now,
                        });
                    }
                }

                // Cascade to every position: cut to_slash bps, classified by
                // whichever pool the position currently sits in.
                let v = state.validator(target)?;
                let v_cfw = v.called_for_withdraw;
                let acc = v.delegators_acc;
                let delegators = v.delegators.to_vec();
                let mut delegators_penalty: Amount = 0;
                let mut active_cut: Amount = 0;
                let mut stopped_cut: Amount = 0;
                for delegator in delegators {
                    let p = state.position_mut(&delegator, target)?;
                    accrual::checkpoint_position(p, v_cfw, acc, &delegator_settings, now)?;
                    let cut = accrual::mul_div(p.amount, delegator_bps, PRECISION)?;
                    let position_stopped = p.is_stopped() || v_cfw > 0;
                    if cut > 0 {
                        p.amount -= cut;
                        delegators_penalty += cut;
                        if position_stopped {
                            stopped_cut += cut;
                        } else {
                            active_cut += cut;
                        }
                    }
                    // A position pushed under threshold is force-stopped only
                    // when this same slash forced its validator to stop.
                    if forced_stop
                        && p.called_for_withdraw == 0
                        && p.amount < delegator_settings.minimum_threshold
                    {
                        p.called_for_withdraw = now;
                        events.push(StakingEvent::DelegatorCalledForWithdraw {
                            delegator,
                            validator: *target,
                            at: now,
                        });
                    }
                }
                pools::sub(&mut state.pools.active_delegators, active_cut)?;
                pools::sub(&mut state.pools.stopped_delegators, stopped_cut)?;
                let v = state.validator_mut(target)?;
                v.delegated_amount -= active_cut;
                v.stopped_delegated_amount -= stopped_cut;

                batch_total += penalty + delegators_penalty;
                events.push(StakingEvent::Slashed {
                    validator: *target,
                    penalty,
                    delegators_penalty,
                });
            }

            if batch_total > 0 {
                if receiver.is_zero() {
                    return Err(MooringError::InvalidState(
                        "slash receiver is not configured".to_string(),
                    ));
                }
                host.transfer(receiver, batch_total)?;
            }
            Ok(batch_total)
        })
    }
}
