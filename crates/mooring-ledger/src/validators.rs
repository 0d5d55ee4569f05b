// crates/mooring-ledger/src/validators.rs
//
// Validator lifecycle: Unregistered -> Active -> StopListed -> Withdrawn,
// with the revive path back to Active.
//
// Deposits register on first use (commission locked forever at that point).
// Call-for-withdraw moves the validator and its entire delegated pool to
// the stopped side regardless of any individual delegator's own status.
// Withdrawal cascades a forced settle-and-payout over every open position.

use mooring_core::{Address, Amount, HostEnv, MooringError, Role, RoleProvider, StakingEvent};

use crate::accrual;
use crate::engine::StakeEngine;
use crate::pools;
use crate::records::{AccountKind, ValidatorRecord};
use crate::settings::validate_commission;

impl StakeEngine {
    /// Deposit own principal as a validator. The first deposit registers the
    /// caller with the given commission; later deposits top up principal and
    /// leave the stored commission untouched.
    pub fn deposit_as_validator(
        &mut self,
        host: &dyn HostEnv,
        caller: Address,
        amount: Amount,
        commission_bps: u32,
    ) -> Result<(), MooringError> {
        self.transact(host.now(), |state, events| {
            let now = host.now();
            deposit_validator_inner(state, caller, amount, commission_bps, 0, now)?;
            events.push(StakingEvent::ValidatorDeposited {
                validator: caller,
                amount,
                commission_bps: state.validator(&caller)?.commission_bps,
            });
            Ok(())
        })
    }

    /// Trusted-intake deposit on behalf of `validator`, carrying a vesting
    /// end that gates its final withdrawal. Requires the Swap role.
    pub fn deposit_for_validator(
        &mut self,
        host: &dyn HostEnv,
        roles: &dyn RoleProvider,
        caller: Address,
        validator: Address,
        amount: Amount,
        commission_bps: u32,
        vesting_end: u64,
    ) -> Result<(), MooringError> {
        Self::require_role(roles, Role::Swap, &caller)?;
        self.transact(host.now(), |state, events| {
            let now = host.now();
            deposit_validator_inner(state, validator, amount, commission_bps, vesting_end, now)?;
            events.push(StakingEvent::DepositedForValidator {
                validator,
                amount,
                vesting_end,
            });
            Ok(())
        })
    }

    /// Claim accrued fixed plus variable reward. Fixed reward is drawn from
    /// the reserve; a zero-reward claim is a no-op that leaves the claim
    /// clock untouched. Returns the amount paid out.
    pub fn claim_as_validator(
        &mut self,
        host: &dyn HostEnv,
        caller: Address,
    ) -> Result<Amount, MooringError> {
        self.transact(host.now(), |state, events| {
            let now = host.now();
            let (fixed, variable) = settle_validator_rewards(state, &caller, now, true)?;
            let total = fixed + variable;
            if total == 0 {
                return Ok(0);
            }
            events.push(StakingEvent::ValidatorClaimed {
                validator: caller,
                fixed,
                variable,
            });
            host.transfer(caller, total)?;
            Ok(total)
        })
    }

    /// Claim and immediately fold the payout back into principal. Only
    /// permitted while active, since stopped principal is frozen.
    pub fn restake_as_validator(
        &mut self,
        host: &dyn HostEnv,
        caller: Address,
    ) -> Result<Amount, MooringError> {
        self.transact(host.now(), |state, events| {
            let now = host.now();
            if state.validator(&caller)?.is_stopped() {
                return Err(MooringError::InvalidState(format!(
                    "{} is stop-listed and cannot restake",
                    caller
                )));
            }
            let (fixed, variable) = settle_validator_rewards(state, &caller, now, true)?;
            let total = fixed + variable;
            if total == 0 {
                return Ok(0);
            }
            let v = state.validator_mut(&caller)?;
            v.amount += total;
            pools::add(&mut state.pools.active_validators, total)?;
            events.push(StakingEvent::ValidatorRestaked {
                validator: caller,
                amount: total,
            });
            Ok(total)
        })
    }

    /// Enter the stop list: freeze own accrual at `now` and reclassify the
    /// entire delegated pool as stopped, regardless of each delegator's own
    /// status.
    pub fn validator_call_for_withdraw(
        &mut self,
        host: &dyn HostEnv,
        caller: Address,
    ) -> Result<(), MooringError> {
        self.transact(host.now(), |state, events| {
            let now = host.now();
            let settings = state.settings.validator.clone();
            let v = state.validator_mut(&caller)?;
            if v.is_stopped() {
                return Err(MooringError::InvalidState(format!(
                    "{} already called for withdraw",
                    caller
                )));
            }
            accrual::checkpoint_validator(v, &settings, now)?;
            v.called_for_withdraw = now;
            let own = v.amount;
            let delegated = v.delegated_amount;
            v.stopped_delegated_amount += delegated;
            v.delegated_amount = 0;
            pools::sub(&mut state.pools.active_validators, own)?;
            pools::add(&mut state.pools.stopped_validators, own)?;
            pools::sub(&mut state.pools.active_delegators, delegated)?;
            pools::add(&mut state.pools.stopped_delegators, delegated)?;
            state.active_validators.remove(&caller);
            state.stopped_validators.insert(caller);
            events.push(StakingEvent::ValidatorCalledForWithdraw {
                validator: caller,
                at: now,
            });
            Ok(())
        })
    }

    /// Complete a stop-listed validator's withdrawal once its cooldown and
    /// vesting have elapsed. Anyone may trigger it; payouts go to the
    /// validator and its delegators. Erases the record entirely.
    pub fn withdraw_for_validator(
        &mut self,
        host: &dyn HostEnv,
        validator: Address,
    ) -> Result<(), MooringError> {
        self.transact(host.now(), |state, events| {
            let now = host.now();
            let withdraw_cooldown = state.settings.validator.withdraw_cooldown;
            let delegator_settings = state.settings.delegator.clone();
            let validator_settings = state.settings.validator.clone();

            let v = state.validator(&validator)?;
            if !v.is_stopped() {
                return Err(MooringError::InvalidState(format!(
                    "{} has not called for withdraw",
                    validator
                )));
            }
            if now < v.called_for_withdraw + withdraw_cooldown {
                return Err(MooringError::TooEarly(format!(
                    "withdraw cooldown for {} elapses at {}",
                    validator,
                    v.called_for_withdraw + withdraw_cooldown
                )));
            }
            if now < v.vesting_end {
                return Err(MooringError::TooEarly(format!(
                    "vesting for {} ends at {}",
                    validator, v.vesting_end
                )));
            }
            let v_cfw = v.called_for_withdraw;
            let acc = v.delegators_acc;
            let delegators = v.delegators.to_vec();

            let mut payouts: Vec<(Address, Amount)> = Vec::new();

            // Forced settle-and-payout for every open position; the claim
            // cooldown does not apply on this path.
            for delegator in delegators {
                let p = state.position_mut(&delegator, &validator)?;
                accrual::checkpoint_position(p, v_cfw, acc, &delegator_settings, now)?;
                let principal = p.amount;
                let fixed = p.fixed.fixed_reward;
                let variable = p.variable.variable_reward;
                state.pools.draw_reserve(fixed)?;
                pools::sub(&mut state.pools.stopped_delegators, principal)?;
                state.totals.fixed_claimed += fixed;
                state.totals.variable_claimed += variable;
                state.erase_position(&delegator, &validator);
                events.push(StakingEvent::DelegatorWithdrawn {
                    delegator,
                    validator,
                    principal,
                    fixed,
                    variable,
                });
                payouts.push((delegator, principal + fixed + variable));
            }

            let v = state.validator_mut(&validator)?;
            accrual::checkpoint_validator(v, &validator_settings, now)?;
            let principal = v.amount;
            let fixed = v.fixed.fixed_reward;
            let variable = v.variable.variable_reward;
            state.pools.draw_reserve(fixed)?;
            pools::sub(&mut state.pools.stopped_validators, principal)?;
            state.totals.fixed_claimed += fixed;
            state.totals.variable_claimed += variable;
            state.validators.remove(&validator);
            state.stopped_validators.remove(&validator);
            state.kinds.remove(&validator);
            events.push(StakingEvent::ValidatorWithdrawn {
                validator,
                principal,
                fixed,
                variable,
            });
            payouts.push((validator, principal + fixed + variable));

            for (to, amount) in payouts {
                if amount > 0 {
                    host.transfer(to, amount)?;
                }
            }
            Ok(())
        })
    }

    /// Withdraw the caller's own validator record.
    pub fn withdraw_as_validator(
        &mut self,
        host: &dyn HostEnv,
        caller: Address,
    ) -> Result<(), MooringError> {
        self.withdraw_for_validator(host, caller)
    }

    /// Leave the stop list and resume accrual from `now`. Delegators that
    /// had not personally called for withdraw migrate back to the active
    /// pool with fresh checkpoint clocks; the rest stay frozen at their own
    /// stop timestamps.
    pub fn revive_as_validator(
        &mut self,
        host: &dyn HostEnv,
        caller: Address,
    ) -> Result<(), MooringError> {
        self.transact(host.now(), |state, events| {
            let now = host.now();
            let validator_settings = state.settings.validator.clone();
            let delegator_settings = state.settings.delegator.clone();
            let limit = state.settings.validators_limit;
            let minimum = state.settings.validator.minimum_threshold;

            let v = state.validator(&caller)?;
            if !v.is_stopped() {
                return Err(MooringError::InvalidState(format!(
                    "{} is not stop-listed",
                    caller
                )));
            }
            if state.active_validators.len() >= limit {
                return Err(MooringError::Capacity(format!(
                    "validator limit of {} reached",
                    limit
                )));
            }
            if v.amount < minimum {
                return Err(MooringError::Validation(format!(
                    "principal of {} is below the minimum threshold of {}",
                    v.amount, minimum
                )));
            }
            let old_cfw = v.called_for_withdraw;
            let acc = v.delegators_acc;
            let delegators = v.delegators.to_vec();

            let v = state.validator_mut(&caller)?;
            // Fold anything outstanding up to the stop time, then restart
            // the clock at now so the stopped interval earns nothing.
            accrual::checkpoint_validator(v, &validator_settings, now)?;
            v.fixed.last_update = now;
            v.called_for_withdraw = 0;
            let own = v.amount;
            pools::sub(&mut state.pools.stopped_validators, own)?;
            pools::add(&mut state.pools.active_validators, own)?;
            state.stopped_validators.remove(&caller);
            state.active_validators.insert(caller);

            let mut reactivated: Amount = 0;
            for delegator in delegators {
                let p = state.position_mut(&delegator, &caller)?;
                if p.is_stopped() {
                    continue;
                }
                accrual::checkpoint_position(p, old_cfw, acc, &delegator_settings, now)?;
                p.fixed.last_update = now;
                reactivated += p.amount;
            }
            if reactivated > 0 {
                pools::sub(&mut state.pools.stopped_delegators, reactivated)?;
                pools::add(&mut state.pools.active_delegators, reactivated)?;
            }
            let v = state.validator_mut(&caller)?;
            v.stopped_delegated_amount -= reactivated;
            v.delegated_amount += reactivated;
            events.push(StakingEvent::ValidatorRevived { validator: caller });
            Ok(())
        })
    }
}

/// Shared deposit path for the public and trusted-intake entry points.
fn deposit_validator_inner(
    state: &mut crate::state::LedgerState,
    validator: Address,
    amount: Amount,
    commission_bps: u32,
    vesting_end: u64,
    now: u64,
) -> Result<(), MooringError> {
    if validator.is_zero() {
        return Err(MooringError::Validation(
            "validator must not be the zero address".to_string(),
        ));
    }
    if amount == 0 {
        return Err(MooringError::Validation(
            "deposit amount must be positive".to_string(),
        ));
    }
    state.require_not_kind(&validator, AccountKind::Delegator)?;
    let settings = state.settings.validator.clone();

    if state.validators.contains_key(&validator) {
        let v = state.validator_mut(&validator)?;
        if v.is_stopped() {
            return Err(MooringError::InvalidState(format!(
                "{} is stop-listed and cannot accept deposits",
                validator
            )));
        }
        // Commission is locked at registration; later values are ignored.
        accrual::checkpoint_validator(v, &settings, now)?;
        v.amount += amount;
        if vesting_end > v.vesting_end {
            v.vesting_end = vesting_end;
        }
    } else {
        validate_commission(commission_bps)?;
        if amount < settings.minimum_threshold {
            return Err(MooringError::Validation(format!(
                "deposit of {} is below the minimum threshold of {}",
                amount, settings.minimum_threshold
            )));
        }
        if state.active_validators.len() >= state.settings.validators_limit {
            return Err(MooringError::Capacity(format!(
                "validator limit of {} reached",
                state.settings.validators_limit
            )));
        }
        let mut v = ValidatorRecord::new(commission_bps, settings.apr_bps, now);
        v.amount = amount;
        v.vesting_end = vesting_end;
        state.validators.insert(validator, v);
        state.active_validators.insert(validator);
        state.kinds.insert(validator, AccountKind::Validator);
    }
    pools::add(&mut state.pools.active_validators, amount)
}

/// Checkpoint and zero out a validator's claimable rewards, drawing the
/// fixed part from the reserve. Applies the claim cooldown when
/// `enforce_cooldown` and the payout is non-zero.
pub(crate) fn settle_validator_rewards(
    state: &mut crate::state::LedgerState,
    validator: &Address,
    now: u64,
    enforce_cooldown: bool,
) -> Result<(Amount, Amount), MooringError> {
    let settings = state.settings.validator.clone();
    let v = state.validator_mut(validator)?;
    accrual::checkpoint_validator(v, &settings, now)?;
    let fixed = v.fixed.fixed_reward;
    let variable = v.variable.variable_reward;
    if fixed + variable == 0 {
        return Ok((0, 0));
    }
    if enforce_cooldown && now < v.last_claim + settings.claim_cooldown {
        return Err(MooringError::TooEarly(format!(
            "claim cooldown for {} elapses at {}",
            validator,
            v.last_claim + settings.claim_cooldown
        )));
    }
    v.fixed.fixed_reward = 0;
    v.fixed.total_claimed += fixed;
    v.variable.variable_reward = 0;
    v.variable.total_claimed += variable;
    v.last_claim = now;
    state.pools.draw_reserve(fixed)?;
    state.totals.fixed_claimed += fixed;
    state.totals.variable_claimed += variable;
    Ok((fixed, variable))
}
