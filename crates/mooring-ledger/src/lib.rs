// crates/mooring-ledger/src/lib.rs
//
// mooring-ledger: the staking ledger and reward-accrual engine for the
// Mooring protocol. Tracks validators and their delegators, accrues two
// independently accounted reward streams (time-proportional fixed and
// pool-share variable), enforces the two-phase exit protocol with
// cooldowns, and applies slashing penalties that cascade from a validator
// to its delegators while preserving the global pool invariants.
//
// All monetary values are integer token base units (1 token = 10^18).

pub mod accrual;
pub mod config;
pub mod delegators;
pub mod distribution;
pub mod engine;
pub mod host;
pub mod pools;
pub mod queries;
pub mod records;
pub mod sets;
pub mod settings;
pub mod slashing;
pub mod state;
pub mod validators;

// Re-export key types for ergonomic access from downstream crates.
pub use accrual::GlobalAccrual;
pub use config::GenesisConfig;
pub use engine::StakeEngine;
pub use host::{MockHost, StaticRoles};
pub use pools::PoolAccountant;
pub use queries::ValidatorListing;
pub use records::{
    AccountKind, DelegatorPosition, FixedRewardState, PenaltyState, ValidatorRecord,
    VariableRewardState,
};
pub use sets::AddressSet;
pub use settings::{
    ProtocolSettings, RoleKind, RoleSettings, COMMISSION_MAX_BPS, COMMISSION_MIN_BPS,
    DELEGATORS_PER_VALIDATOR_LIMIT,
};
pub use state::{LedgerState, LifetimeTotals};
