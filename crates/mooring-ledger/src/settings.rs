// crates/mooring-ledger/src/settings.rs
//
// Runtime-adjustable role settings for validators and delegators, plus the
// protocol-wide knobs (validator limit, slash receiver).
//
// Setting changes apply prospectively only: every record accrues at its own
// APR snapshot until its next checkpoint, so a rate change never rewrites
// an accrual sub-period already in force.

use serde::{Deserialize, Serialize};

use mooring_core::{Address, Amount, Bps, MooringError, Timestamp, PRECISION, TOKEN};

/// Which of the two staking roles a settings block applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleKind {
    Validator,
    Delegator,
}

/// Per-role parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSettings {
    /// Annualized fixed-reward rate in basis points.
    pub apr_bps: Bps,
    /// Slash parameter: an absolute token amount for validators, basis
    /// points of each position for delegators.
    pub to_slash: Amount,
    /// Minimum principal to hold (or revive into) the role.
    pub minimum_threshold: Amount,
    /// Minimum seconds between reward claims.
    pub claim_cooldown: Timestamp,
    /// Seconds between call-for-withdraw and permitted withdrawal.
    pub withdraw_cooldown: Timestamp,
}

/// Protocol-wide settings: both role blocks plus global knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolSettings {
    pub validator: RoleSettings,
    pub delegator: RoleSettings,
    /// Maximum number of validators in the active set.
    pub validators_limit: usize,
    /// Receiver of all slashing proceeds.
    pub slash_receiver: Address,
}

/// Lowest commission a validator may register with: 5%.
pub const COMMISSION_MIN_BPS: Bps = 500;

/// Highest commission a validator may register with: 30%.
pub const COMMISSION_MAX_BPS: Bps = 3_000;

/// Hard cap on positions per validator; bounds iteration cost of
/// validator-wide operations (withdraw cascade, slashing).
pub const DELEGATORS_PER_VALIDATOR_LIMIT: usize = 4_800;

const DAY: Timestamp = 86_400;

impl Default for ProtocolSettings {
    fn default() -> Self {
        Self {
            validator: RoleSettings {
                apr_bps: 1_500,
                to_slash: 100 * TOKEN,
                minimum_threshold: 100_000 * TOKEN,
                claim_cooldown: 14 * DAY,
                withdraw_cooldown: 7 * DAY,
            },
            delegator: RoleSettings {
                apr_bps: 1_300,
                to_slash: 500,
                minimum_threshold: 1_000 * TOKEN,
                claim_cooldown: 30 * DAY,
                withdraw_cooldown: 5 * DAY,
            },
            validators_limit: 101,
            slash_receiver: Address::ZERO,
        }
    }
}

impl ProtocolSettings {
    pub fn role(&self, kind: RoleKind) -> &RoleSettings {
        match kind {
            RoleKind::Validator => &self.validator,
            RoleKind::Delegator => &self.delegator,
        }
    }

    pub fn role_mut(&mut self, kind: RoleKind) -> &mut RoleSettings {
        match kind {
            RoleKind::Validator => &mut self.validator,
            RoleKind::Delegator => &mut self.delegator,
        }
    }

    pub fn set_apr(&mut self, kind: RoleKind, apr_bps: Bps) {
        self.role_mut(kind).apr_bps = apr_bps;
    }

    /// Set the slash parameter. Delegator values are basis points and must
    /// not exceed 100%.
    pub fn set_to_slash(&mut self, kind: RoleKind, value: Amount) -> Result<(), MooringError> {
        if kind == RoleKind::Delegator && value > PRECISION {
            return Err(MooringError::Validation(format!(
                "delegator slash of {} bps exceeds {}",
                value, PRECISION
            )));
        }
        self.role_mut(kind).to_slash = value;
        Ok(())
    }

    pub fn set_minimum_threshold(&mut self, kind: RoleKind, amount: Amount) {
        self.role_mut(kind).minimum_threshold = amount;
    }

    pub fn set_claim_cooldown(&mut self, kind: RoleKind, seconds: Timestamp) {
        self.role_mut(kind).claim_cooldown = seconds;
    }

    pub fn set_withdraw_cooldown(&mut self, kind: RoleKind, seconds: Timestamp) {
        self.role_mut(kind).withdraw_cooldown = seconds;
    }

    pub fn set_validators_limit(&mut self, limit: usize) -> Result<(), MooringError> {
        if limit == 0 {
            return Err(MooringError::Validation(
                "validator limit must be positive".to_string(),
            ));
        }
        self.validators_limit = limit;
        Ok(())
    }

    pub fn set_slash_receiver(&mut self, receiver: Address) -> Result<(), MooringError> {
        if receiver.is_zero() {
            return Err(MooringError::Validation(
                "slash receiver must not be the zero address".to_string(),
            ));
        }
        self.slash_receiver = receiver;
        Ok(())
    }
}

/// Validate a commission rate against the registration bounds.
pub fn validate_commission(commission_bps: Bps) -> Result<(), MooringError> {
    if !(COMMISSION_MIN_BPS..=COMMISSION_MAX_BPS).contains(&commission_bps) {
        return Err(MooringError::Validation(format!(
            "commission of {} bps outside [{}, {}]",
            commission_bps, COMMISSION_MIN_BPS, COMMISSION_MAX_BPS
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ProtocolSettings::default();
        assert_eq!(settings.validator.apr_bps, 1_500);
        assert_eq!(settings.delegator.apr_bps, 1_300);
        assert_eq!(settings.validators_limit, 101);
    }

    #[test]
    fn test_commission_bounds() {
        assert!(validate_commission(499).is_err());
        assert!(validate_commission(500).is_ok());
        assert!(validate_commission(3_000).is_ok());
        assert!(validate_commission(3_001).is_err());
    }

    #[test]
    fn test_delegator_slash_capped_at_precision() {
        let mut settings = ProtocolSettings::default();
        assert!(settings.set_to_slash(RoleKind::Delegator, PRECISION).is_ok());
        assert!(settings
            .set_to_slash(RoleKind::Delegator, PRECISION + 1)
            .is_err());
        // Validator slash is an absolute amount, not bps
        assert!(settings
            .set_to_slash(RoleKind::Validator, 1_000_000 * TOKEN)
            .is_ok());
    }

    #[test]
    fn test_slash_receiver_rejects_zero() {
        let mut settings = ProtocolSettings::default();
        assert!(settings.set_slash_receiver(Address::ZERO).is_err());
        assert!(settings
            .set_slash_receiver(Address::from_bytes([7u8; 20]))
            .is_ok());
    }
}
