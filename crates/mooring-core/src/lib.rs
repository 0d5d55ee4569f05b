// crates/mooring-core/src/lib.rs
//
// mooring-core: core types, identity, error taxonomy, host-environment
// traits, and event types for the Mooring staking engine.
//
// All monetary values are tracked in base units (1 token = 10^18 units).

pub mod error;
pub mod events;
pub mod identity;
pub mod traits;
pub mod types;

// Re-export key types for ergonomic access from downstream crates.
pub use error::MooringError;
pub use events::StakingEvent;
pub use identity::Address;
pub use traits::{HostEnv, Role, RoleProvider};
pub use types::{Amount, Bps, Timestamp, ACCURACY, PRECISION, TOKEN, YEAR_SECONDS};
