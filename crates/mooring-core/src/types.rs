// crates/mooring-core/src/types.rs
//
// Scalar aliases and fixed-point constants shared by every engine module.
//
// All accounting is integer arithmetic in token base units; reward formulas
// use floor (truncating) division so results never round up.

/// Token amount in base units. 1 token = 10^18 base units.
pub type Amount = u128;

/// Unix timestamp in seconds, as supplied by the host clock.
pub type Timestamp = u64;

/// Rate in basis points (1 bps = 1/100 of a percent).
pub type Bps = u32;

/// Base units per whole token.
pub const TOKEN: Amount = 1_000_000_000_000_000_000;

/// Denominator for basis-point rates: 10,000 bps = 100%.
pub const PRECISION: Amount = 10_000;

/// Scale factor for the reward-per-share accumulator.
///
/// 10^12 keeps `amount * ACCURACY` inside u128 for 10^18-scale amounts
/// while leaving six decimal digits of per-unit reward resolution.
pub const ACCURACY: Amount = 1_000_000_000_000;

/// Seconds in the accrual year (365 days).
pub const YEAR_SECONDS: u64 = 31_536_000;
