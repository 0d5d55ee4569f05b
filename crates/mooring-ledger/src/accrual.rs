// crates/mooring-ledger/src/accrual.rs
//
// Reward accrual engine: the elapsed-time fixed-reward formula, the
// reward-per-share accumulator, and the checkpoint operations applied to
// validator records and delegator positions.
//
// Fixed reward for principal P over elapsed seconds dt at `apr` bps:
//
//   P * dt * apr / (YEAR_SECONDS * PRECISION)
//
// using floor (truncating) integer division throughout. The accrual
// interval's right boundary is min(now, stop timestamp): a stopped
// validator freezes at its own call-for-withdraw time, a position at the
// earlier of its own and its validator's.
//
// A checkpoint must run before any principal or rate change: it folds the
// newly accrued reward into the stored balance, advances `last_update` to
// the right boundary, and refreshes the APR snapshot, closing the accrual
// sub-period at the rate that was in force during it.

use serde::{Deserialize, Serialize};

use mooring_core::{Amount, Bps, MooringError, Timestamp, ACCURACY, PRECISION, YEAR_SECONDS};

use crate::records::{DelegatorPosition, ValidatorRecord};
use crate::settings::RoleSettings;

/// Floor of `a * b / den` in u128, with overflow surfaced as an error.
pub fn mul_div(a: Amount, b: Amount, den: Amount) -> Result<Amount, MooringError> {
    a.checked_mul(b)
        .ok_or_else(|| MooringError::Overflow(format!("{} * {} overflows u128", a, b)))
        .map(|product| product / den)
}

/// Fixed reward earned by `principal` from `from` to `until` at `apr_bps`.
/// Returns zero when the interval is empty or inverted.
pub fn fixed_earned(
    principal: Amount,
    from: Timestamp,
    until: Timestamp,
    apr_bps: Bps,
) -> Result<Amount, MooringError> {
    if until <= from {
        return Ok(0);
    }
    let elapsed = Amount::from(until - from);
    let scaled = principal.checked_mul(elapsed).ok_or_else(|| {
        MooringError::Overflow(format!("{} * {} overflows u128", principal, elapsed))
    })?;
    mul_div(
        scaled,
        Amount::from(apr_bps),
        Amount::from(YEAR_SECONDS) * PRECISION,
    )
}

/// Accumulator increment for distributing `amount` over `total_delegated`.
/// Returns zero when the pool is empty (the caller absorbs the amount).
pub fn acc_increment(amount: Amount, total_delegated: Amount) -> Result<Amount, MooringError> {
    if total_delegated == 0 {
        return Ok(0);
    }
    mul_div(amount, ACCURACY, total_delegated)
}

/// A position's variable reward earned across an accumulator delta.
pub fn acc_earned(acc_delta: Amount, position_amount: Amount) -> Result<Amount, MooringError> {
    mul_div(acc_delta, position_amount, ACCURACY)
}

/// Right accrual boundary for a validator: its stop time caps earning.
pub fn validator_boundary(record: &ValidatorRecord, now: Timestamp) -> Timestamp {
    if record.called_for_withdraw > 0 {
        now.min(record.called_for_withdraw)
    } else {
        now
    }
}

/// Right accrual boundary for a position: the earlier of its own stop time
/// and its validator's caps further earning.
pub fn position_boundary(
    position: &DelegatorPosition,
    validator_cfw: Timestamp,
    now: Timestamp,
) -> Timestamp {
    let mut boundary = now;
    if position.called_for_withdraw > 0 {
        boundary = boundary.min(position.called_for_withdraw);
    }
    if validator_cfw > 0 {
        boundary = boundary.min(validator_cfw);
    }
    boundary
}

/// Checkpoint a validator record.
///
/// Folds newly accrued fixed reward into `fixed_reward`, re-accumulates the
/// potential penalty when the validator has been slashed before, advances
/// the clock, and refreshes the APR snapshot from current settings.
pub fn checkpoint_validator(
    record: &mut ValidatorRecord,
    settings: &RoleSettings,
    now: Timestamp,
) -> Result<(), MooringError> {
    let until = validator_boundary(record, now);
    let accrued = fixed_earned(
        record.amount,
        record.fixed.last_update,
        until,
        record.fixed.apr_bps,
    )?;
    if accrued > 0 {
        record.fixed.fixed_reward = record
            .fixed
            .fixed_reward
            .checked_add(accrued)
            .ok_or_else(|| MooringError::Overflow("fixed reward overflow".to_string()))?;
        if record.penalty.last_slash > 0 {
            record.penalty.potential_penalty = record
                .penalty
                .potential_penalty
                .checked_add(accrued)
                .ok_or_else(|| MooringError::Overflow("potential penalty overflow".to_string()))?;
        }
    }
    if until > record.fixed.last_update {
        record.fixed.last_update = until;
    }
    record.fixed.apr_bps = settings.apr_bps;
    Ok(())
}

/// Checkpoint a delegator position against its validator's accumulator.
///
/// Settles both streams: elapsed-time fixed reward up to the position's
/// boundary, and the pool-share variable reward since `stored_acc`.
pub fn checkpoint_position(
    position: &mut DelegatorPosition,
    validator_cfw: Timestamp,
    delegators_acc: Amount,
    settings: &RoleSettings,
    now: Timestamp,
) -> Result<(), MooringError> {
    let until = position_boundary(position, validator_cfw, now);
    let accrued = fixed_earned(
        position.amount,
        position.fixed.last_update,
        until,
        position.fixed.apr_bps,
    )?;
    if accrued > 0 {
        position.fixed.fixed_reward = position
            .fixed
            .fixed_reward
            .checked_add(accrued)
            .ok_or_else(|| MooringError::Overflow("fixed reward overflow".to_string()))?;
    }
    if until > position.fixed.last_update {
        position.fixed.last_update = until;
    }
    position.fixed.apr_bps = settings.apr_bps;

    // Variable stream: the accumulator keeps paying stopped positions, so
    // no boundary applies here.
    let delta = delegators_acc.saturating_sub(position.stored_acc);
    if delta > 0 && position.amount > 0 {
        let earned = acc_earned(delta, position.amount)?;
        position.variable.variable_reward = position
            .variable
            .variable_reward
            .checked_add(earned)
            .ok_or_else(|| MooringError::Overflow("variable reward overflow".to_string()))?;
    }
    position.stored_acc = delegators_acc;
    Ok(())
}

/// Pending (unmutated) total fixed reward of a validator as of `now`.
pub fn pending_validator_fixed(
    record: &ValidatorRecord,
    now: Timestamp,
) -> Result<Amount, MooringError> {
    let until = validator_boundary(record, now);
    let accrued = fixed_earned(
        record.amount,
        record.fixed.last_update,
        until,
        record.fixed.apr_bps,
    )?;
    Ok(record.fixed.fixed_reward + accrued)
}

/// Pending (unmutated) rewards of a position as of `now`:
/// `(fixed, variable)`.
pub fn pending_position_rewards(
    position: &DelegatorPosition,
    validator_cfw: Timestamp,
    delegators_acc: Amount,
    now: Timestamp,
) -> Result<(Amount, Amount), MooringError> {
    let until = position_boundary(position, validator_cfw, now);
    let accrued = fixed_earned(
        position.amount,
        position.fixed.last_update,
        until,
        position.fixed.apr_bps,
    )?;
    let delta = delegators_acc.saturating_sub(position.stored_acc);
    let variable = position.variable.variable_reward + acc_earned(delta, position.amount)?;
    Ok((position.fixed.fixed_reward + accrued, variable))
}

/// Coarse reporting-only tracker of total fixed reward ever accrued across
/// one role's active pool, advanced with the same elapsed-time formula
/// against the pool total. Never consulted for per-account accounting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalAccrual {
    pub fixed_accrued: Amount,
    pub last_update: Timestamp,
}

impl GlobalAccrual {
    /// Fold the elapsed interval at the current pool total and rate.
    pub fn advance(
        &mut self,
        pool_total: Amount,
        apr_bps: Bps,
        now: Timestamp,
    ) -> Result<(), MooringError> {
        let accrued = fixed_earned(pool_total, self.last_update, now, apr_bps)?;
        self.fixed_accrued = self.fixed_accrued.saturating_add(accrued);
        if now > self.last_update {
            self.last_update = now;
        }
        Ok(())
    }

    /// The tracker's value as of `now` without mutating it.
    pub fn projected(
        &self,
        pool_total: Amount,
        apr_bps: Bps,
        now: Timestamp,
    ) -> Result<Amount, MooringError> {
        Ok(self
            .fixed_accrued
            .saturating_add(fixed_earned(pool_total, self.last_update, now, apr_bps)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mooring_core::TOKEN;

    fn settings() -> RoleSettings {
        RoleSettings {
            apr_bps: 1_300,
            to_slash: 500,
            minimum_threshold: 1_000 * TOKEN,
            claim_cooldown: 0,
            withdraw_cooldown: 0,
        }
    }

    #[test]
    fn test_fixed_earned_one_year() {
        // 1,000 tokens at 13% for exactly one year
        let earned = fixed_earned(1_000 * TOKEN, 0, YEAR_SECONDS, 1_300).unwrap();
        assert_eq!(earned, 130 * TOKEN);
    }

    #[test]
    fn test_fixed_earned_floors() {
        // 3 units for 1 second at 1 bps: 3*1*1/(31_536_000*10_000) floors to 0
        assert_eq!(fixed_earned(3, 0, 1, 1).unwrap(), 0);
    }

    #[test]
    fn test_fixed_earned_empty_interval() {
        assert_eq!(fixed_earned(TOKEN, 100, 100, 1_300).unwrap(), 0);
        assert_eq!(fixed_earned(TOKEN, 200, 100, 1_300).unwrap(), 0);
    }

    #[test]
    fn test_zero_apr_earns_nothing() {
        assert_eq!(fixed_earned(1_000 * TOKEN, 0, YEAR_SECONDS, 0).unwrap(), 0);
    }

    #[test]
    fn test_checkpoint_idempotent_at_zero_elapsed() {
        let mut v = ValidatorRecord::new(1_500, 1_300, 100);
        v.amount = 1_000 * TOKEN;
        checkpoint_validator(&mut v, &settings(), 100 + YEAR_SECONDS).unwrap();
        let snapshot = v.clone();
        // Second checkpoint with zero elapsed time changes nothing
        checkpoint_validator(&mut v, &settings(), 100 + YEAR_SECONDS).unwrap();
        assert_eq!(v, snapshot);
    }

    #[test]
    fn test_validator_accrual_freezes_at_stop() {
        let mut v = ValidatorRecord::new(1_500, 1_300, 0);
        v.amount = 1_000 * TOKEN;
        v.called_for_withdraw = YEAR_SECONDS as Timestamp;
        // Two years elapse, but accrual stops at the call-for-withdraw time
        checkpoint_validator(&mut v, &settings(), 2 * YEAR_SECONDS).unwrap();
        assert_eq!(v.fixed.fixed_reward, 130 * TOKEN);
        assert_eq!(v.fixed.last_update, YEAR_SECONDS);
    }

    #[test]
    fn test_position_boundary_takes_earlier_stop() {
        let mut p = DelegatorPosition::new(0, 1_300, 0);
        p.amount = 1_000 * TOKEN;
        p.called_for_withdraw = 500;
        assert_eq!(position_boundary(&p, 300, 1_000), 300);
        assert_eq!(position_boundary(&p, 700, 1_000), 500);
        assert_eq!(position_boundary(&p, 0, 1_000), 500);
        p.called_for_withdraw = 0;
        assert_eq!(position_boundary(&p, 0, 1_000), 1_000);
    }

    #[test]
    fn test_checkpoint_refreshes_apr_snapshot() {
        let mut v = ValidatorRecord::new(1_500, 1_300, 0);
        v.amount = 1_000 * TOKEN;
        let mut new_rate = settings();
        new_rate.apr_bps = 2_600;
        // The elapsed year still accrues at the old 13% snapshot
        checkpoint_validator(&mut v, &new_rate, YEAR_SECONDS).unwrap();
        assert_eq!(v.fixed.fixed_reward, 130 * TOKEN);
        assert_eq!(v.fixed.apr_bps, 2_600);
        // The next year accrues at the refreshed rate
        checkpoint_validator(&mut v, &new_rate, 2 * YEAR_SECONDS).unwrap();
        assert_eq!(v.fixed.fixed_reward, 130 * TOKEN + 260 * TOKEN);
    }

    #[test]
    fn test_potential_penalty_accumulates_after_slash() {
        let mut v = ValidatorRecord::new(1_500, 1_300, 0);
        v.amount = 1_000 * TOKEN;
        // Never slashed: no potential penalty
        checkpoint_validator(&mut v, &settings(), YEAR_SECONDS).unwrap();
        assert_eq!(v.penalty.potential_penalty, 0);
        // After a slash, accrued reward doubles as pending penalty
        v.penalty.last_slash = YEAR_SECONDS;
        checkpoint_validator(&mut v, &settings(), 2 * YEAR_SECONDS).unwrap();
        assert_eq!(v.penalty.potential_penalty, 130 * TOKEN);
    }

    #[test]
    fn test_potential_penalty_overflow_is_error() {
        let mut v = ValidatorRecord::new(1_500, 1_300, 0);
        v.amount = 1_000 * TOKEN;
        v.penalty.last_slash = 1;
        v.penalty.potential_penalty = u128::MAX;
        let result = checkpoint_validator(&mut v, &settings(), YEAR_SECONDS);
        assert!(matches!(result, Err(MooringError::Overflow(_))));
    }

    #[test]
    fn test_accumulator_round_trip() {
        let total = 850 * TOKEN;
        let increment = acc_increment(total, 1_000 * TOKEN).unwrap();
        let mut p = DelegatorPosition::new(0, 1_300, 0);
        p.amount = 1_000 * TOKEN;
        checkpoint_position(&mut p, 0, increment, &settings(), 0).unwrap();
        // Sole delegator recovers the full distribution (modulo flooring)
        assert_eq!(p.variable.variable_reward, total);
        assert_eq!(p.stored_acc, increment);
    }

    #[test]
    fn test_accumulator_empty_pool_is_noop() {
        assert_eq!(acc_increment(850 * TOKEN, 0).unwrap(), 0);
    }

    #[test]
    fn test_global_accrual_projection() {
        let mut tracker = GlobalAccrual::default();
        tracker.advance(1_000 * TOKEN, 1_300, YEAR_SECONDS).unwrap();
        assert_eq!(tracker.fixed_accrued, 130 * TOKEN);
        let projected = tracker
            .projected(1_000 * TOKEN, 1_300, 2 * YEAR_SECONDS)
            .unwrap();
        assert_eq!(projected, 260 * TOKEN);
        // Projection does not mutate
        assert_eq!(tracker.fixed_accrued, 130 * TOKEN);
    }
}
