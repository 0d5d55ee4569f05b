// crates/mooring-ledger/src/host.rs
//
// In-memory implementations of the host-environment traits, for tests and
// embedding harnesses: a settable clock with recorded transfers, and a
// static role table.

use std::cell::{Cell, RefCell};

use mooring_core::{Address, Amount, HostEnv, MooringError, Role, RoleProvider, Timestamp};

/// A host with a manually advanced clock and an in-memory transfer log.
#[derive(Debug, Default)]
pub struct MockHost {
    now: Cell<Timestamp>,
    transfers: RefCell<Vec<(Address, Amount)>>,
    fail_transfers: Cell<bool>,
}

impl MockHost {
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: Cell::new(now),
            transfers: RefCell::new(Vec::new()),
            fail_transfers: Cell::new(false),
        }
    }

    pub fn set_now(&self, now: Timestamp) {
        self.now.set(now);
    }

    pub fn advance(&self, seconds: Timestamp) {
        self.now.set(self.now.get() + seconds);
    }

    /// Make every subsequent transfer fail, to exercise abort paths.
    pub fn set_fail_transfers(&self, fail: bool) {
        self.fail_transfers.set(fail);
    }

    /// All transfers performed so far, in order.
    pub fn transfers(&self) -> Vec<(Address, Amount)> {
        self.transfers.borrow().clone()
    }

    /// Sum of everything transferred to `to`.
    pub fn total_sent_to(&self, to: &Address) -> Amount {
        self.transfers
            .borrow()
            .iter()
            .filter(|(addr, _)| addr == to)
            .map(|(_, amount)| amount)
            .sum()
    }
}

impl HostEnv for MockHost {
    fn now(&self) -> Timestamp {
        self.now.get()
    }

    fn transfer(&self, to: Address, amount: Amount) -> Result<(), MooringError> {
        if self.fail_transfers.get() {
            return Err(MooringError::TransferFailed(format!(
                "transfer of {} to {} rejected by host",
                amount, to
            )));
        }
        self.transfers.borrow_mut().push((to, amount));
        Ok(())
    }
}

/// A fixed role table.
#[derive(Debug, Default)]
pub struct StaticRoles {
    admins: Vec<Address>,
    distributors: Vec<Address>,
    swappers: Vec<Address>,
}

impl StaticRoles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_admin(mut self, addr: Address) -> Self {
        self.admins.push(addr);
        self
    }

    pub fn with_distributor(mut self, addr: Address) -> Self {
        self.distributors.push(addr);
        self
    }

    pub fn with_swapper(mut self, addr: Address) -> Self {
        self.swappers.push(addr);
        self
    }
}

impl RoleProvider for StaticRoles {
    fn has_role(&self, role: Role, who: &Address) -> bool {
        match role {
            Role::Admin => self.admins.contains(who),
            Role::Distributor => self.distributors.contains(who),
            Role::Swap => self.swappers.contains(who),
        }
    }
}
