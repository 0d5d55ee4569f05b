// crates/mooring-ledger/src/pools.rs
//
// Pool accountant: four running principal counters plus the fixed-reward
// reserve. Pure bookkeeping; every other module must keep these exactly
// consistent with the per-entity sums.
//
// Counter moves use checked arithmetic so an inconsistency surfaces as an
// overflow error instead of a silent wrap.

use serde::{Deserialize, Serialize};

use mooring_core::{Amount, MooringError};

/// Global pool counters and the fixed-reward payout reserve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolAccountant {
    /// Sum of principal over validators in the active set.
    pub active_validators: Amount,
    /// Sum of position principal classified as actively delegated.
    pub active_delegators: Amount,
    /// Sum of principal over stop-listed validators.
    pub stopped_validators: Amount,
    /// Sum of position principal classified as stop-listed.
    pub stopped_delegators: Amount,
    /// Reserve backing fixed-reward payouts. Funded externally; claims
    /// draw it down and fail when it cannot cover them.
    pub fixed_reserve: Amount,
}

impl PoolAccountant {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total principal across all four pools.
    pub fn total_staked(&self) -> Amount {
        self.active_validators
            + self.active_delegators
            + self.stopped_validators
            + self.stopped_delegators
    }

    /// Draw `amount` from the fixed-reward reserve.
    ///
    /// # Errors
    /// Returns `MooringError::InsufficientReserve` when the reserve cannot
    /// cover the draw.
    pub fn draw_reserve(&mut self, amount: Amount) -> Result<(), MooringError> {
        if amount > self.fixed_reserve {
            return Err(MooringError::InsufficientReserve(format!(
                "fixed-reward claim of {} exceeds reserve of {}",
                amount, self.fixed_reserve
            )));
        }
        self.fixed_reserve -= amount;
        Ok(())
    }
}

/// Add with overflow surfaced as an error.
pub fn add(counter: &mut Amount, amount: Amount) -> Result<(), MooringError> {
    *counter = counter
        .checked_add(amount)
        .ok_or_else(|| MooringError::Overflow("pool counter overflow".to_string()))?;
    Ok(())
}

/// Subtract with underflow surfaced as an error. An underflow here means a
/// per-entity sum diverged from its pool counter.
pub fn sub(counter: &mut Amount, amount: Amount) -> Result<(), MooringError> {
    *counter = counter
        .checked_sub(amount)
        .ok_or_else(|| MooringError::Overflow("pool counter underflow".to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mooring_core::TOKEN;

    #[test]
    fn test_total_staked() {
        let pools = PoolAccountant {
            active_validators: 100 * TOKEN,
            active_delegators: 10 * TOKEN,
            stopped_validators: 5 * TOKEN,
            stopped_delegators: 1 * TOKEN,
            fixed_reserve: 50 * TOKEN,
        };
        assert_eq!(pools.total_staked(), 116 * TOKEN);
    }

    #[test]
    fn test_draw_reserve() {
        let mut pools = PoolAccountant {
            fixed_reserve: 10 * TOKEN,
            ..PoolAccountant::default()
        };
        assert!(pools.draw_reserve(4 * TOKEN).is_ok());
        assert_eq!(pools.fixed_reserve, 6 * TOKEN);
    }

    #[test]
    fn test_draw_reserve_insufficient() {
        let mut pools = PoolAccountant {
            fixed_reserve: 3 * TOKEN,
            ..PoolAccountant::default()
        };
        let result = pools.draw_reserve(4 * TOKEN);
        assert!(matches!(result, Err(MooringError::InsufficientReserve(_))));
        // Reserve untouched on failure
        assert_eq!(pools.fixed_reserve, 3 * TOKEN);
    }

    #[test]
    fn test_sub_underflow_is_error() {
        let mut counter = 5u128;
        assert!(sub(&mut counter, 6).is_err());
        assert_eq!(counter, 5);
    }
}
