//! Shared fixture for the engine integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use rosca_engine::RoscaEngine;
use rosca_types::{
    Address, Circle, CircleId, Clock, EngineConfig, InMemoryToken, ManualClock, Notification,
    Timestamp, TokenId, constants::SECONDS_PER_DAY,
};
use rust_decimal::Decimal;

pub const START: u64 = 1_700_000_000;
pub const DAY: u64 = SECONDS_PER_DAY;
pub const FUNDING: i64 = 10_000;

pub type TestEngine = RoscaEngine<Arc<InMemoryToken>, Arc<ManualClock>>;

pub fn dec(n: i64) -> Decimal {
    Decimal::new(n, 0)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Engine on a manual clock and an in-memory token, with one allowed
/// token (`usd`).
pub struct Fixture {
    pub engine: TestEngine,
    pub token: Arc<InMemoryToken>,
    pub clock: Arc<ManualClock>,
    pub admin: Address,
    pub pool: Address,
    pub usd: TokenId,
}

impl Fixture {
    pub fn new() -> Self {
        init_tracing();
        let admin = Address::from_low_u64(0xad);
        let pool = Address::from_low_u64(0x9001);
        let usd = TokenId(Address::from_low_u64(0x05d));
        let token = Arc::new(InMemoryToken::new(pool));
        let clock = Arc::new(ManualClock::new(Timestamp(START)));
        let engine = RoscaEngine::with_clock(
            EngineConfig::new(admin, pool),
            Arc::clone(&token),
            Arc::clone(&clock),
        )
        .expect("valid config");
        engine.set_allowed(admin, usd, true).expect("admin may allow");
        Self {
            engine,
            token,
            clock,
            admin,
            pool,
            usd,
        }
    }

    /// `n` funded members with deterministic addresses.
    pub fn members(&self, n: u64) -> Vec<Address> {
        (1..=n)
            .map(|i| {
                let m = Address::from_low_u64(0x1000 + i);
                self.token.mint(self.usd, m, dec(FUNDING));
                m
            })
            .collect()
    }

    /// One-day rounds, 1000 max, starting now, owned by `members[0]`.
    pub fn circle(&self, members: &[Address], amount: i64) -> CircleId {
        self.engine
            .create(self.circle_record(members, amount))
            .expect("valid circle")
    }

    pub fn circle_record(&self, members: &[Address], amount: i64) -> Circle {
        Circle::dummy(
            members.to_vec(),
            self.usd,
            dec(amount),
            self.clock.now(),
        )
    }

    pub fn advance_days(&self, days: u64) {
        self.clock.advance(days * DAY);
    }

    pub fn wallet(&self, who: Address) -> Decimal {
        self.token.balance_of(self.usd, who)
    }

    pub fn pool_balance(&self) -> Decimal {
        self.wallet(self.pool)
    }

    pub fn balances(&self, circle_id: CircleId) -> Vec<Decimal> {
        self.engine
            .get_member_balances(circle_id)
            .expect("circle exists")
            .into_iter()
            .map(|(_, b)| b)
            .collect()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.engine
            .notifications()
            .iter()
            .map(|r| r.notification.kind())
            .collect()
    }

    pub fn last_notification(&self) -> Notification {
        self.engine
            .notifications()
            .last()
            .expect("at least one notification")
            .notification
            .clone()
    }
}
