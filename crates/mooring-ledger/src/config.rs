// crates/mooring-ledger/src/config.rs
//
// Genesis configuration for the staking engine.
// Loaded from a TOML file or populated with sensible defaults.

use serde::Deserialize;
use std::fs;

use mooring_core::{Address, Amount, MooringError, Timestamp, TOKEN};

use crate::settings::{ProtocolSettings, RoleKind, RoleSettings};

/// Initial parameters for one staking role.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleConfig {
    /// Annualized fixed-reward rate in basis points.
    pub apr_bps: u32,
    /// Slash parameter: absolute token amount for validators, bps for
    /// delegators.
    pub to_slash: Amount,
    /// Minimum principal, in whole tokens.
    pub minimum_threshold_tokens: Amount,
    /// Minimum seconds between reward claims.
    pub claim_cooldown: Timestamp,
    /// Seconds between call-for-withdraw and permitted withdrawal.
    pub withdraw_cooldown: Timestamp,
}

/// Genesis configuration for the engine.
#[derive(Debug, Clone, Deserialize)]
pub struct GenesisConfig {
    #[serde(default = "default_validator_config")]
    pub validator: RoleConfig,

    #[serde(default = "default_delegator_config")]
    pub delegator: RoleConfig,

    /// Maximum number of validators in the active set.
    #[serde(default = "default_validators_limit")]
    pub validators_limit: usize,

    /// Hex address receiving all slashing proceeds. Must be set before the
    /// first slash; the admin can change it later.
    #[serde(default)]
    pub slash_receiver: Option<String>,
}

fn default_validator_config() -> RoleConfig {
    RoleConfig {
        apr_bps: 1_500,
        to_slash: 100 * TOKEN,
        minimum_threshold_tokens: 100_000,
        claim_cooldown: 14 * 86_400,
        withdraw_cooldown: 7 * 86_400,
    }
}

fn default_delegator_config() -> RoleConfig {
    RoleConfig {
        apr_bps: 1_300,
        to_slash: 500,
        minimum_threshold_tokens: 1_000,
        claim_cooldown: 30 * 86_400,
        withdraw_cooldown: 5 * 86_400,
    }
}

fn default_validators_limit() -> usize {
    101
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            validator: default_validator_config(),
            delegator: default_delegator_config(),
            validators_limit: default_validators_limit(),
            slash_receiver: None,
        }
    }
}

impl GenesisConfig {
    /// Load configuration from a TOML file at the given path.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: GenesisConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Materialize protocol settings from this configuration.
    pub fn settings(&self) -> Result<ProtocolSettings, MooringError> {
        let mut settings = ProtocolSettings {
            validator: role_settings(&self.validator),
            delegator: role_settings(&self.delegator),
            ..ProtocolSettings::default()
        };
        settings.set_validators_limit(self.validators_limit)?;
        // Revalidate the delegator slash bps through the setter.
        settings.set_to_slash(RoleKind::Delegator, self.delegator.to_slash)?;
        if let Some(receiver) = &self.slash_receiver {
            settings.set_slash_receiver(receiver.parse::<Address>()?)?;
        }
        Ok(settings)
    }
}

fn role_settings(config: &RoleConfig) -> RoleSettings {
    RoleSettings {
        apr_bps: config.apr_bps,
        to_slash: config.to_slash,
        minimum_threshold: config.minimum_threshold_tokens * TOKEN,
        claim_cooldown: config.claim_cooldown,
        withdraw_cooldown: config.withdraw_cooldown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_default_settings() {
        let from_config = GenesisConfig::default().settings().unwrap();
        assert_eq!(from_config, ProtocolSettings::default());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: GenesisConfig = toml::from_str(
            r#"
            validators_limit = 7
            slash_receiver = "0x0101010101010101010101010101010101010101"

            [delegator]
            apr_bps = 900
            to_slash = 250
            minimum_threshold_tokens = 500
            claim_cooldown = 86400
            withdraw_cooldown = 86400
            "#,
        )
        .unwrap();
        let settings = config.settings().unwrap();
        assert_eq!(settings.validators_limit, 7);
        assert_eq!(settings.delegator.apr_bps, 900);
        assert_eq!(settings.delegator.minimum_threshold, 500 * TOKEN);
        // Unspecified validator table falls back to defaults
        assert_eq!(settings.validator.apr_bps, 1_500);
        assert!(!settings.slash_receiver.is_zero());
    }

    #[test]
    fn test_rejects_oversized_delegator_slash() {
        let config: GenesisConfig = toml::from_str(
            r#"
            [delegator]
            apr_bps = 1300
            to_slash = 10001
            minimum_threshold_tokens = 1000
            claim_cooldown = 0
            withdraw_cooldown = 0
            "#,
        )
        .unwrap();
        assert!(config.settings().is_err());
    }
}
