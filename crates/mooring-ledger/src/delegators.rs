// crates/mooring-ledger/src/delegators.rs
//
// Delegator lifecycle, one mirrored state machine per (delegator, validator)
// pair: NoPosition -> Active -> StopListed -> Withdrawn, with revive back to
// Active while the validator itself is not stop-listed.
//
// A position's pool classification follows both parties: it counts as
// stopped as soon as either the position or its validator has called for
// withdraw.

use mooring_core::{Address, Amount, HostEnv, MooringError, StakingEvent};

use crate::accrual;
use crate::engine::StakeEngine;
use crate::pools;
use crate::records::{AccountKind, DelegatorPosition};
use crate::settings::DELEGATORS_PER_VALIDATOR_LIMIT;

impl StakeEngine {
    /// Open or top up a position against a currently-active validator.
    pub fn deposit_as_delegator(
        &mut self,
        host: &dyn HostEnv,
        caller: Address,
        validator: Address,
        amount: Amount,
    ) -> Result<(), MooringError> {
        self.transact(host.now(), |state, events| {
            let now = host.now();
            if amount == 0 {
                return Err(MooringError::Validation(
                    "deposit amount must be positive".to_string(),
                ));
            }
            state.require_not_kind(&caller, AccountKind::Validator)?;
            let settings = state.settings.delegator.clone();
            let v = state.validator(&validator)?;
            if v.is_stopped() {
                return Err(MooringError::InvalidState(format!(
                    "{} is stop-listed and cannot accept delegation",
                    validator
                )));
            }
            let acc = v.delegators_acc;

            if state.positions.contains_key(&(caller, validator)) {
                let p = state.position_mut(&caller, &validator)?;
                if p.is_stopped() {
                    return Err(MooringError::InvalidState(format!(
                        "position of {} with {} already called for withdraw",
                        caller, validator
                    )));
                }
                // Settle both streams before the principal change.
                accrual::checkpoint_position(p, 0, acc, &settings, now)?;
                p.amount += amount;
            } else {
                let v = state.validator(&validator)?;
                if v.delegators.len() >= DELEGATORS_PER_VALIDATOR_LIMIT {
                    return Err(MooringError::InvalidState(format!(
                        "{} already has the maximum of {} delegators",
                        validator, DELEGATORS_PER_VALIDATOR_LIMIT
                    )));
                }
                if amount < settings.minimum_threshold {
                    return Err(MooringError::Validation(format!(
                        "deposit of {} is below the minimum threshold of {}",
                        amount, settings.minimum_threshold
                    )));
                }
                let mut p = DelegatorPosition::new(acc, settings.apr_bps, now);
                p.amount = amount;
                state.positions.insert((caller, validator), p);
                state
                    .delegated_to
                    .entry(caller)
                    .or_default()
                    .insert(validator);
                state.kinds.insert(caller, AccountKind::Delegator);
            }
            let v = state.validator_mut(&validator)?;
            v.delegators.insert(caller);
            v.delegated_amount += amount;
            pools::add(&mut state.pools.active_delegators, amount)?;
            events.push(StakingEvent::DelegatorDeposited {
                delegator: caller,
                validator,
                amount,
            });
            Ok(())
        })
    }

    /// Claim accrued rewards on one position. Returns the amount paid out;
    /// a zero-reward claim is a no-op.
    pub fn claim_as_delegator(
        &mut self,
        host: &dyn HostEnv,
        caller: Address,
        validator: Address,
    ) -> Result<Amount, MooringError> {
        self.transact(host.now(), |state, events| {
            let now = host.now();
            let (fixed, variable) =
                settle_position_rewards(state, &caller, &validator, now, true)?;
            let total = fixed + variable;
            if total == 0 {
                return Ok(0);
            }
            events.push(StakingEvent::DelegatorClaimed {
                delegator: caller,
                validator,
                fixed,
                variable,
            });
            host.transfer(caller, total)?;
            Ok(total)
        })
    }

    /// Claim and fold the payout back into the position. Requires both the
    /// position and its validator to be active.
    pub fn restake_as_delegator(
        &mut self,
        host: &dyn HostEnv,
        caller: Address,
        validator: Address,
    ) -> Result<Amount, MooringError> {
        self.transact(host.now(), |state, events| {
            let now = host.now();
            if state.validator(&validator)?.is_stopped() {
                return Err(MooringError::InvalidState(format!(
                    "{} is stop-listed; its positions cannot restake",
                    validator
                )));
            }
            if state.position(&caller, &validator)?.is_stopped() {
                return Err(MooringError::InvalidState(format!(
                    "position of {} with {} already called for withdraw",
                    caller, validator
                )));
            }
            let (fixed, variable) =
                settle_position_rewards(state, &caller, &validator, now, true)?;
            let total = fixed + variable;
            if total == 0 {
                return Ok(0);
            }
            let p = state.position_mut(&caller, &validator)?;
            p.amount += total;
            let v = state.validator_mut(&validator)?;
            v.delegated_amount += total;
            pools::add(&mut state.pools.active_delegators, total)?;
            events.push(StakingEvent::DelegatorRestaked {
                delegator: caller,
                validator,
                amount: total,
            });
            Ok(total)
        })
    }

    /// Stop-list one position. If the validator is still active the
    /// principal migrates to the stopped pools; if it is already stopped the
    /// classification is unchanged and only the personal flag and accrual
    /// boundary move.
    pub fn delegator_call_for_withdraw(
        &mut self,
        host: &dyn HostEnv,
        caller: Address,
        validator: Address,
    ) -> Result<(), MooringError> {
        self.transact(host.now(), |state, events| {
            let now = host.now();
            let settings = state.settings.delegator.clone();
            let v = state.validator(&validator)?;
            let v_cfw = v.called_for_withdraw;
            let acc = v.delegators_acc;
            let p = state.position_mut(&caller, &validator)?;
            if p.is_stopped() {
                return Err(MooringError::InvalidState(format!(
                    "position of {} with {} already called for withdraw",
                    caller, validator
                )));
            }
            accrual::checkpoint_position(p, v_cfw, acc, &settings, now)?;
            p.called_for_withdraw = now;
            let amount = p.amount;
            if v_cfw == 0 {
                pools::sub(&mut state.pools.active_delegators, amount)?;
                pools::add(&mut state.pools.stopped_delegators, amount)?;
                let v = state.validator_mut(&validator)?;
                v.delegated_amount -= amount;
                v.stopped_delegated_amount += amount;
            }
            events.push(StakingEvent::DelegatorCalledForWithdraw {
                delegator: caller,
                validator,
                at: now,
            });
            Ok(())
        })
    }

    /// Complete a stop-listed position's withdrawal. Anyone may trigger it;
    /// the payout goes to the delegator. The gate is the later of the
    /// position's and the validator's stop timestamps plus the cooldown.
    pub fn withdraw_for_delegator(
        &mut self,
        host: &dyn HostEnv,
        delegator: Address,
        validator: Address,
    ) -> Result<(), MooringError> {
        self.transact(host.now(), |state, events| {
            let now = host.now();
            let settings = state.settings.delegator.clone();
            let v = state.validator(&validator)?;
            let v_cfw = v.called_for_withdraw;
            let acc = v.delegators_acc;
            let p = state.position(&delegator, &validator)?;
            if !p.is_stopped() {
                return Err(MooringError::InvalidState(format!(
                    "position of {} with {} has not called for withdraw",
                    delegator, validator
                )));
            }
            let gate = p.called_for_withdraw.max(v_cfw) + settings.withdraw_cooldown;
            if now < gate {
                return Err(MooringError::TooEarly(format!(
                    "withdraw cooldown for the position of {} elapses at {}",
                    delegator, gate
                )));
            }
            let p = state.position_mut(&delegator, &validator)?;
            accrual::checkpoint_position(p, v_cfw, acc, &settings, now)?;
            let principal = p.amount;
            let fixed = p.fixed.fixed_reward;
            let variable = p.variable.variable_reward;
            state.pools.draw_reserve(fixed)?;
            pools::sub(&mut state.pools.stopped_delegators, principal)?;
            state.totals.fixed_claimed += fixed;
            state.totals.variable_claimed += variable;
            let v = state.validator_mut(&validator)?;
            v.stopped_delegated_amount -= principal;
            v.delegators.remove(&delegator);
            state.erase_position(&delegator, &validator);
            events.push(StakingEvent::DelegatorWithdrawn {
                delegator,
                validator,
                principal,
                fixed,
                variable,
            });
            host.transfer(delegator, principal + fixed + variable)
        })
    }

    /// Withdraw the caller's own position.
    pub fn withdraw_as_delegator(
        &mut self,
        host: &dyn HostEnv,
        caller: Address,
        validator: Address,
    ) -> Result<(), MooringError> {
        self.withdraw_for_delegator(host, caller, validator)
    }

    /// Reactivate a stop-listed position. Permitted only while the validator
    /// itself is not stop-listed, and only above the minimum threshold.
    pub fn revive_as_delegator(
        &mut self,
        host: &dyn HostEnv,
        caller: Address,
        validator: Address,
    ) -> Result<(), MooringError> {
        self.transact(host.now(), |state, events| {
            let now = host.now();
            let settings = state.settings.delegator.clone();
            let v = state.validator(&validator)?;
            if v.is_stopped() {
                return Err(MooringError::InvalidState(format!(
                    "{} is stop-listed; revive the validator first",
                    validator
                )));
            }
            let acc = v.delegators_acc;
            let p = state.position_mut(&caller, &validator)?;
            if !p.is_stopped() {
                return Err(MooringError::InvalidState(format!(
                    "position of {} with {} is not stop-listed",
                    caller, validator
                )));
            }
            if p.amount < settings.minimum_threshold {
                return Err(MooringError::Validation(format!(
                    "position of {} is below the minimum threshold of {}",
                    p.amount, settings.minimum_threshold
                )));
            }
            // Fold the frozen interval, then restart the clock at now so the
            // stopped period earns nothing.
            accrual::checkpoint_position(p, 0, acc, &settings, now)?;
            p.fixed.last_update = now;
            p.called_for_withdraw = 0;
            let amount = p.amount;
            pools::sub(&mut state.pools.stopped_delegators, amount)?;
            pools::add(&mut state.pools.active_delegators, amount)?;
            let v = state.validator_mut(&validator)?;
            v.stopped_delegated_amount -= amount;
            v.delegated_amount += amount;
            events.push(StakingEvent::DelegatorRevived {
                delegator: caller,
                validator,
            });
            Ok(())
        })
    }
}

/// Checkpoint and zero out a position's claimable rewards, drawing the
/// fixed part from the reserve. Applies the claim cooldown when
/// `enforce_cooldown` and the payout is non-zero.
pub(crate) fn settle_position_rewards(
    state: &mut crate::state::LedgerState,
    delegator: &Address,
    validator: &Address,
    now: u64,
    enforce_cooldown: bool,
) -> Result<(Amount, Amount), MooringError> {
    let settings = state.settings.delegator.clone();
    let v = state.validator(validator)?;
    let v_cfw = v.called_for_withdraw;
    let acc = v.delegators_acc;
    let p = state.position_mut(delegator, validator)?;
    accrual::checkpoint_position(p, v_cfw, acc, &settings, now)?;
    let fixed = p.fixed.fixed_reward;
    let variable = p.variable.variable_reward;
    if fixed + variable == 0 {
        return Ok((0, 0));
    }
    if enforce_cooldown && now < p.last_claim + settings.claim_cooldown {
        return Err(MooringError::TooEarly(format!(
            "claim cooldown for the position of {} elapses at {}",
            delegator,
            p.last_claim + settings.claim_cooldown
        )));
    }
    p.fixed.fixed_reward = 0;
    p.fixed.total_claimed += fixed;
    p.variable.variable_reward = 0;
    p.variable.total_claimed += variable;
    p.last_claim = now;
    state.pools.draw_reserve(fixed)?;
    state.totals.fixed_claimed += fixed;
    state.totals.variable_claimed += variable;
    Ok((fixed, variable))
}
