// crates/mooring-core/src/traits.rs

use crate::error::MooringError;
use crate::identity::Address;
use crate::types::{Amount, Timestamp};

/// Roles recognized by the engine. Grants and revocations live in an
/// external registry; the engine only queries membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// May adjust role settings, the validator limit, the slash receiver,
    /// and sweep excess fixed-reward reserve.
    Admin,
    /// May distribute rewards and slash validators.
    Distributor,
    /// The trusted vesting-bridge intake: may deposit on behalf of a
    /// validator with a vesting-end timestamp attached.
    Swap,
}

/// The hosting execution environment, as consumed by the engine.
///
/// Provides a monotonic clock and a native value-transfer primitive.
/// Transfer failure must abort the whole operation; the engine never
/// silently drops funds.
pub trait HostEnv {
    /// Current time in unix seconds. Monotonic across operations.
    fn now(&self) -> Timestamp;

    /// Transfer `amount` base units of native value to `to`.
    fn transfer(&self, to: Address, amount: Amount) -> Result<(), MooringError>;
}

/// External role-based access control registry.
pub trait RoleProvider {
    /// Whether `who` currently holds `role`.
    fn has_role(&self, role: Role, who: &Address) -> bool;
}
