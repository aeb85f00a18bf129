//! The engine facade: every operation and query, serialized.
//!
//! State lives behind one `RwLock`. Mutating operations take the circle's
//! [`CircleGuard`](crate::guard::CircleGuard) first and check their rules
//! under the read lock. The lock is released before the token boundary is
//! called, and the change is written under the write lock only once the
//! transfer has succeeded. The guard keeps the circle unchanged in between,
//! so readers only ever see committed state.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rosca_types::{
    Address, Circle, CircleId, Clock, EngineConfig, Notification, Result, RoscaError,
    RoundSchedule, SystemClock, TokenId, TokenTransfer,
};
use rust_decimal::Decimal;

use crate::{
    decommission,
    guard::ReentrancyGuard,
    ledger::BalanceLedger,
    membership::MembershipIndex,
    notifications::{NotificationLog, NotificationRecord},
    registry::TokenRegistry,
    round,
    store::{self, CircleStore},
};

struct EngineState {
    registry: TokenRegistry,
    store: CircleStore,
    membership: MembershipIndex,
    ledger: BalanceLedger,
    notifications: NotificationLog,
}

fn require_member(membership: &MembershipIndex, circle_id: CircleId, who: Address) -> Result<()> {
    if membership.is_member(circle_id, &who) {
        Ok(())
    } else {
        Err(RoscaError::NotMember {
            circle_id,
            member: who,
        })
    }
}

/// Rotating savings circle engine.
///
/// `T` is the host's token capability, `C` the source of the current time.
pub struct RoscaEngine<T, C = SystemClock> {
    config: EngineConfig,
    state: RwLock<EngineState>,
    guard: ReentrancyGuard,
    token: T,
    clock: C,
}

impl<T: TokenTransfer> RoscaEngine<T, SystemClock> {
    /// Engine on wall-clock time.
    pub fn new(config: EngineConfig, token: T) -> Result<Self> {
        Self::with_clock(config, token, SystemClock)
    }
}

impl<T: TokenTransfer, C: Clock> RoscaEngine<T, C> {
    /// # Errors
    /// `Configuration` if the config names a zero administrator or pool.
    pub fn with_clock(config: EngineConfig, token: T, clock: C) -> Result<Self> {
        config.validate()?;
        let state = EngineState {
            registry: TokenRegistry::new(),
            store: CircleStore::new(),
            membership: MembershipIndex::new(),
            ledger: BalanceLedger::new(),
            notifications: NotificationLog::with_capacity(config.notification_capacity),
        };
        tracing::info!(
            administrator = %config.administrator,
            pool = %config.pool,
            "Rosca engine initialized"
        );
        Ok(Self {
            config,
            state: RwLock::new(state),
            guard: ReentrancyGuard::new(),
            token,
            clock,
        })
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn token(&self) -> &T {
        &self.token
    }

    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    #[must_use]
    pub fn administrator(&self) -> Address {
        self.config.administrator
    }

    fn read(&self) -> RwLockReadGuard<'_, EngineState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, EngineState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // =================================================================
    // Registry
    // =================================================================

    /// Set or clear a token's allow-list flag. Administrator only.
    pub fn set_allowed(&self, caller: Address, token: TokenId, allowed: bool) -> Result<()> {
        if caller != self.config.administrator {
            return Err(RoscaError::NotAdministrator(caller));
        }
        let mut state = self.write();
        let previous = state.registry.set_allowed(token, allowed);
        state
            .notifications
            .append(Notification::TokenAllowanceChanged { token, allowed })?;
        tracing::info!(%token, allowed, previous, "Token allow-list updated");
        Ok(())
    }

    #[must_use]
    pub fn is_token_allowed(&self, token: &TokenId) -> bool {
        self.read().registry.is_allowed(token)
    }

    #[must_use]
    pub fn allowed_tokens(&self) -> Vec<TokenId> {
        self.read().registry.allowed_tokens()
    }

    // =================================================================
    // Circle store
    // =================================================================

    /// Validate and persist a new circle, returning its identifier.
    pub fn create(&self, circle: Circle) -> Result<CircleId> {
        let mut state = self.write();
        store::validate_circle(&circle, &state.registry)?;

        let members = circle.members.clone();
        let notification = Notification::CircleCreated {
            circle_id: state.store.next_id(),
            members: members.clone(),
            token: circle.token,
            deposit_amount: circle.deposit_amount,
            deposit_interval: circle.deposit_interval,
        };
        let circle_id = state.store.insert(circle);
        state.membership.register(circle_id, &members);
        state.notifications.append(notification)?;

        tracing::info!(
            circle = %circle_id,
            members = members.len(),
            "Circle created"
        );
        Ok(circle_id)
    }

    // =================================================================
    // Round engine
    // =================================================================

    /// Pay `amount` from `caller` toward `for_member`'s contribution for
    /// the current round.
    ///
    /// The ledger is credited only after `transfer_from` succeeds.
    pub fn deposit(
        &self,
        caller: Address,
        circle_id: CircleId,
        amount: Decimal,
        for_member: Address,
    ) -> Result<()> {
        let _held = self.guard.acquire(circle_id)?;
        let now = self.clock.now();

        let (token, total) = {
            let state = self.read();
            let circle = state
                .store
                .get(circle_id)
                .ok_or(RoscaError::NotCommissioned(circle_id))?;
            require_member(&state.membership, circle_id, caller)?;
            require_member(&state.membership, circle_id, for_member)?;
            if amount.is_sign_negative() {
                return Err(RoscaError::InvalidAmount(amount));
            }
            round::check_deposit_window(circle, now)?;
            let balance = state.ledger.balance(circle_id, &for_member);
            (circle.token, round::check_capacity(circle, balance, amount)?)
        };

        let pool = self.config.pool;
        if !self.token.transfer_from(&token, caller, pool, amount) {
            tracing::warn!(
                circle = %circle_id,
                depositor = %caller,
                %amount,
                "Deposit transfer failed"
            );
            return Err(RoscaError::TransferFailed {
                token,
                to: pool,
                amount,
            });
        }

        let mut state = self.write();
        state.ledger.set(circle_id, for_member, total);
        state.notifications.append(Notification::FundsDeposited {
            circle_id,
            depositor: caller,
            member: for_member,
            amount,
        })?;
        tracing::debug!(
            circle = %circle_id,
            depositor = %caller,
            member = %for_member,
            %amount,
            %total,
            "Deposit accepted"
        );
        Ok(())
    }

    /// Pay the full pool to `for_member`, who must be next in rotation.
    ///
    /// Balances are reset and the rotation advanced only after the payout
    /// transfer succeeds.
    pub fn withdraw(
        &self,
        caller: Address,
        circle_id: CircleId,
        for_member: Address,
    ) -> Result<()> {
        let _held = self.guard.acquire(circle_id)?;
        let now = self.clock.now();

        let (token, payout, next_index) = {
            let state = self.read();
            let circle = state
                .store
                .get(circle_id)
                .ok_or(RoscaError::NotCommissioned(circle_id))?;
            require_member(&state.membership, circle_id, caller)?;
            round::check_withdraw(circle_id, circle, &state.ledger, &for_member, now)?;
            let payout = circle.payout_amount().ok_or_else(|| {
                RoscaError::ArithmeticOverflow(format!("{circle_id} payout"))
            })?;
            (circle.token, payout, circle.next_index())
        };

        if !self.token.transfer(&token, for_member, payout) {
            tracing::warn!(
                circle = %circle_id,
                member = %for_member,
                amount = %payout,
                "Payout transfer failed"
            );
            return Err(RoscaError::TransferFailed {
                token,
                to: for_member,
                amount: payout,
            });
        }

        let mut state = self.write();
        state.ledger.clear_round(circle_id);
        if let Some(circle) = state.store.get_mut(circle_id) {
            circle.current_index = next_index;
        }
        state.notifications.append(Notification::FundsWithdrawn {
            circle_id,
            member: for_member,
            amount: payout,
        })?;
        tracing::info!(
            circle = %circle_id,
            member = %for_member,
            amount = %payout,
            next_index,
            "Pool paid out"
        );
        Ok(())
    }

    // =================================================================
    // Decommission engine
    // =================================================================

    /// Refund every held balance and delete the circle.
    ///
    /// Refunds are issued one at a time and each balance is zeroed once its
    /// transfer succeeds. If one fails, the refunds already sent stay
    /// recorded as paid, the remaining balances are untouched, and the
    /// circle survives so the call can be repeated.
    pub fn decommission(&self, caller: Address, circle_id: CircleId) -> Result<()> {
        let _held = self.guard.acquire(circle_id)?;
        let now = self.clock.now();

        let (token, plan) = {
            let state = self.read();
            let circle = state
                .store
                .get(circle_id)
                .ok_or(RoscaError::NotCommissioned(circle_id))?;
            require_member(&state.membership, circle_id, caller)?;
            decommission::authorize(circle_id, circle, &caller, &state.ledger, now)?;
            (
                circle.token,
                decommission::refund_plan(circle_id, circle, &state.ledger),
            )
        };

        for (member, amount) in &plan {
            if !self.token.transfer(&token, *member, *amount) {
                tracing::warn!(
                    circle = %circle_id,
                    member = %member,
                    %amount,
                    "Refund transfer failed, circle kept"
                );
                return Err(RoscaError::TransferFailed {
                    token,
                    to: *member,
                    amount: *amount,
                });
            }
            self.write().ledger.set(circle_id, *member, Decimal::ZERO);
        }

        let mut state = self.write();
        state.store.remove(circle_id);
        state.ledger.clear_round(circle_id);
        state
            .notifications
            .append(Notification::CircleDecommissioned { circle_id })?;
        tracing::info!(
            circle = %circle_id,
            caller = %caller,
            refunds = plan.len(),
            "Circle decommissioned"
        );
        Ok(())
    }

    // =================================================================
    // Queries
    // =================================================================

    /// # Errors
    /// `NotCommissioned` if the circle does not exist.
    pub fn get_circle(&self, circle_id: CircleId) -> Result<Circle> {
        self.read()
            .store
            .get(circle_id)
            .cloned()
            .ok_or(RoscaError::NotCommissioned(circle_id))
    }

    /// Batch lookup. Missing circles yield `None` instead of failing.
    #[must_use]
    pub fn get_circles(&self, circle_ids: &[CircleId]) -> Vec<Option<Circle>> {
        let state = self.read();
        circle_ids
            .iter()
            .map(|id| state.store.get(*id).cloned())
            .collect()
    }

    /// Every circle `member` has ever belonged to.
    #[must_use]
    pub fn get_member_circles(&self, member: &Address) -> Vec<CircleId> {
        self.read().membership.circles_of(member).to_vec()
    }

    /// Current-round balances, in rotation order.
    pub fn get_member_balances(&self, circle_id: CircleId) -> Result<Vec<(Address, Decimal)>> {
        let state = self.read();
        let circle = state
            .store
            .get(circle_id)
            .ok_or(RoscaError::NotCommissioned(circle_id))?;
        let balances = state.ledger.balances_of(circle_id, &circle.members);
        Ok(circle.members.iter().copied().zip(balances).collect())
    }

    /// Membership of `member` in each listed circle.
    #[must_use]
    pub fn check_memberships(&self, member: &Address, circle_ids: &[CircleId]) -> Vec<bool> {
        let state = self.read();
        circle_ids
            .iter()
            .map(|id| state.membership.is_member(*id, member))
            .collect()
    }

    #[must_use]
    pub fn is_member(&self, circle_id: CircleId, who: &Address) -> bool {
        self.read().membership.is_member(circle_id, who)
    }

    /// Whether the current round could be paid out now. `false` for a
    /// missing circle.
    #[must_use]
    pub fn is_withdrawable(&self, circle_id: CircleId) -> bool {
        let now = self.clock.now();
        let state = self.read();
        state
            .store
            .get(circle_id)
            .is_some_and(|c| round::is_withdrawable(circle_id, c, &state.ledger, now))
    }

    /// The member whose turn it is.
    pub fn withdrawable_by(&self, circle_id: CircleId) -> Result<Address> {
        self.read()
            .store
            .get(circle_id)
            .and_then(Circle::current_recipient)
            .ok_or(RoscaError::NotCommissioned(circle_id))
    }

    pub fn round_schedule(&self, circle_id: CircleId) -> Result<RoundSchedule> {
        self.read()
            .store
            .get(circle_id)
            .map(Circle::schedule)
            .ok_or(RoscaError::NotCommissioned(circle_id))
    }

    pub fn payout_amount(&self, circle_id: CircleId) -> Result<Decimal> {
        let circle = self.get_circle(circle_id)?;
        circle
            .payout_amount()
            .ok_or_else(|| RoscaError::ArithmeticOverflow(format!("{circle_id} payout")))
    }

    /// Identifiers ever assigned, including decommissioned circles.
    #[must_use]
    pub fn circle_count(&self) -> u64 {
        self.read().store.count()
    }

    #[must_use]
    pub fn notifications(&self) -> Vec<NotificationRecord> {
        self.read().notifications.records().to_vec()
    }

    #[must_use]
    pub fn notifications_since(&self, seq: u64) -> Vec<NotificationRecord> {
        self.read().notifications.since(seq).to_vec()
    }

    #[must_use]
    pub fn notification_head(&self) -> [u8; 32] {
        self.read().notifications.head()
    }

    pub fn verify_notifications(&self) -> Result<()> {
        self.read().notifications.verify_chain()
    }
}
