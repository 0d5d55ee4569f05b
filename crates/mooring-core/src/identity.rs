// crates/mooring-core/src/identity.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MooringError;

/// A 20-byte account address as assigned by the hosting execution
/// environment. The engine never derives addresses itself; it only keys
/// records by them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The all-zero address. Never a valid participant.
    pub const ZERO: Address = Address([0u8; 20]);

    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// True for the all-zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = MooringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(raw)
            .map_err(|e| MooringError::Validation(format!("Invalid address hex: {}", e)))?;
        let arr: [u8; 20] = bytes
            .try_into()
            .map_err(|_| MooringError::Validation("Address must be 20 bytes".to_string()))?;
        Ok(Address(arr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_address() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address::from_bytes([1u8; 20]).is_zero());
    }

    #[test]
    fn test_display_round_trip() {
        let addr = Address::from_bytes([0xab; 20]);
        let shown = addr.to_string();
        assert!(shown.starts_with("0x"));
        assert_eq!(shown.parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!("0xabcd".parse::<Address>().is_err());
    }
}
