// crates/mooring-ledger/src/engine.rs
//
// StakeEngine: the transactional shell around LedgerState, plus the
// administrative and reserve operations.
//
// Every public operation runs against a working clone of the state and the
// clone replaces the committed state only on success, so any error leaves
// no partial mutation behind. A reentrancy flag rejects nested entry into
// another guarded operation: unreachable through the `&mut self` surface,
// it covers embedders whose `HostEnv::transfer` hands control to code that
// could call back into a shared engine. Checkpoints always run before
// principal mutation.

use mooring_core::{
    Address, Amount, HostEnv, MooringError, Role, RoleProvider, StakingEvent, Timestamp,
};

use crate::config::GenesisConfig;
use crate::pools;
use crate::settings::{ProtocolSettings, RoleKind};
use crate::state::LedgerState;

/// The staking ledger and reward-accrual engine.
pub struct StakeEngine {
    state: LedgerState,
    events: Vec<StakingEvent>,
    entered: bool,
}

impl StakeEngine {
    pub fn new(settings: ProtocolSettings) -> Self {
        Self {
            state: LedgerState::new(settings),
            events: Vec::new(),
            entered: false,
        }
    }

    /// Build an engine from a genesis configuration.
    pub fn from_config(config: &GenesisConfig) -> Result<Self, MooringError> {
        Ok(Self::new(config.settings()?))
    }

    /// Read access to the committed state.
    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    /// Drain the events emitted by committed operations, in order.
    pub fn take_events(&mut self) -> Vec<StakingEvent> {
        std::mem::take(&mut self.events)
    }

    /// Run `f` against a working copy of the state. On `Ok` the copy and
    /// its buffered events are committed; on `Err` both are discarded.
    ///
    /// The reporting-only global accrual trackers advance to `now` before
    /// `f` runs, so a settings change inside `f` is prospective there too.
    pub(crate) fn transact<T>(
        &mut self,
        now: Timestamp,
        f: impl FnOnce(&mut LedgerState, &mut Vec<StakingEvent>) -> Result<T, MooringError>,
    ) -> Result<T, MooringError> {
        if self.entered {
            return Err(MooringError::Reentrancy);
        }
        self.entered = true;
        let mut working = self.state.clone();
        let mut pending = Vec::new();
        let outcome = working
            .touch_global_accrual(now)
            .and_then(|_| f(&mut working, &mut pending));
        self.entered = false;
        match outcome {
            Ok(value) => {
                self.state = working;
                for event in &pending {
                    tracing::debug!(?event, "staking event");
                }
                self.events.extend(pending);
                Ok(value)
            }
            Err(e) => Err(e),
        }
    }

    pub(crate) fn require_role(
        roles: &dyn RoleProvider,
        role: Role,
        caller: &Address,
    ) -> Result<(), MooringError> {
        if !roles.has_role(role, caller) {
            return Err(MooringError::Unauthorized(format!(
                "{} lacks the {:?} role",
                caller, role
            )));
        }
        Ok(())
    }

    // ---- administrative operations -------------------------------------

    /// Set a role's APR. Applies prospectively: each record keeps accruing
    /// at its own snapshot until its next checkpoint.
    pub fn set_apr(
        &mut self,
        host: &dyn HostEnv,
        roles: &dyn RoleProvider,
        caller: Address,
        kind: RoleKind,
        apr_bps: u32,
    ) -> Result<(), MooringError> {
        Self::require_role(roles, Role::Admin, &caller)?;
        self.transact(host.now(), |state, _| {
            state.settings.set_apr(kind, apr_bps);
            Ok(())
        })
    }

    pub fn set_to_slash(
        &mut self,
        host: &dyn HostEnv,
        roles: &dyn RoleProvider,
        caller: Address,
        kind: RoleKind,
        value: Amount,
    ) -> Result<(), MooringError> {
        Self::require_role(roles, Role::Admin, &caller)?;
        self.transact(host.now(), |state, _| state.settings.set_to_slash(kind, value))
    }

    pub fn set_minimum_threshold(
        &mut self,
        host: &dyn HostEnv,
        roles: &dyn RoleProvider,
        caller: Address,
        kind: RoleKind,
        amount: Amount,
    ) -> Result<(), MooringError> {
        Self::require_role(roles, Role::Admin, &caller)?;
        self.transact(host.now(), |state, _| {
            state.settings.set_minimum_threshold(kind, amount);
            Ok(())
        })
    }

    pub fn set_claim_cooldown(
        &mut self,
        host: &dyn HostEnv,
        roles: &dyn RoleProvider,
        caller: Address,
        kind: RoleKind,
        seconds: Timestamp,
    ) -> Result<(), MooringError> {
        Self::require_role(roles, Role::Admin, &caller)?;
        self.transact(host.now(), |state, _| {
            state.settings.set_claim_cooldown(kind, seconds);
            Ok(())
        })
    }

    pub fn set_withdraw_cooldown(
        &mut self,
        host: &dyn HostEnv,
        roles: &dyn RoleProvider,
        caller: Address,
        kind: RoleKind,
        seconds: Timestamp,
    ) -> Result<(), MooringError> {
        Self::require_role(roles, Role::Admin, &caller)?;
        self.transact(host.now(), |state, _| {
            state.settings.set_withdraw_cooldown(kind, seconds);
            Ok(())
        })
    }

    pub fn set_validators_limit(
        &mut self,
        host: &dyn HostEnv,
        roles: &dyn RoleProvider,
        caller: Address,
        limit: usize,
    ) -> Result<(), MooringError> {
        Self::require_role(roles, Role::Admin, &caller)?;
        self.transact(host.now(), |state, _| {
            if limit < state.active_validators.len() {
                return Err(MooringError::Validation(format!(
                    "limit of {} is below the {} currently active validators",
                    limit,
                    state.active_validators.len()
                )));
            }
            state.settings.set_validators_limit(limit)
        })
    }

    pub fn set_slash_receiver(
        &mut self,
        host: &dyn HostEnv,
        roles: &dyn RoleProvider,
        caller: Address,
        receiver: Address,
    ) -> Result<(), MooringError> {
        Self::require_role(roles, Role::Admin, &caller)?;
        self.transact(host.now(), |state, _| {
            state.settings.set_slash_receiver(receiver)
        })
    }

    // ---- fixed-reward reserve ------------------------------------------

    /// Credit attached value to the fixed-reward reserve. Anyone may fund.
    pub fn fund_fixed_reserve(
        &mut self,
        host: &dyn HostEnv,
        caller: Address,
        amount: Amount,
    ) -> Result<(), MooringError> {
        if amount == 0 {
            return Err(MooringError::Validation(
                "reserve funding amount must be positive".to_string(),
            ));
        }
        self.transact(host.now(), |state, events| {
            pools::add(&mut state.pools.fixed_reserve, amount)?;
            events.push(StakingEvent::ReserveFunded {
                from: caller,
                amount,
            });
            Ok(())
        })
    }

    /// Sweep excess reserve to `to`. Administrative.
    pub fn sweep_fixed_reserve(
        &mut self,
        host: &dyn HostEnv,
        roles: &dyn RoleProvider,
        caller: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), MooringError> {
        Self::require_role(roles, Role::Admin, &caller)?;
        if to.is_zero() {
            return Err(MooringError::Validation(
                "sweep target must not be the zero address".to_string(),
            ));
        }
        self.transact(host.now(), |state, events| {
            state.pools.draw_reserve(amount)?;
            events.push(StakingEvent::ReserveSwept { to, amount });
            host.transfer(to, amount)
        })
    }
}
