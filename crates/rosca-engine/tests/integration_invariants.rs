//! Randomized operation sequences checked against the engine's invariants.
//!
//! A seeded RNG drives deposits, withdrawals, decommissions and clock
//! movement across several circles sharing one pool. After every step the
//! ledger, the token balances and each circle's rotation must agree.

mod common;

use common::{DAY, FUNDING, Fixture, dec};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rosca_types::{Address, CircleId, Clock, RoscaError};
use rust_decimal::Decimal;

struct World {
    fx: Fixture,
    members: Vec<Address>,
    circles: Vec<(CircleId, Vec<Address>)>,
    minted: Decimal,
}

impl World {
    fn new(rng: &mut StdRng) -> Self {
        let fx = Fixture::new();
        let members = fx.members(6);
        let minted = dec(FUNDING) * Decimal::from(members.len());
        let mut world = Self {
            fx,
            members,
            circles: Vec::new(),
            minted,
        };
        for _ in 0..3 {
            world.spawn_circle(rng);
        }
        world
    }

    fn spawn_circle(&mut self, rng: &mut StdRng) {
        let size = rng.gen_range(2..=4);
        let offset = rng.gen_range(0..self.members.len());
        let group: Vec<Address> = (0..size)
            .map(|i| self.members[(offset + i) % self.members.len()])
            .collect();
        let amount = rng.gen_range(1..=5) * 10;
        let id = self.fx.circle(&group, amount);
        self.circles.push((id, group));
    }

    fn live(&self) -> Vec<CircleId> {
        self.circles
            .iter()
            .map(|(id, _)| *id)
            .filter(|id| self.fx.engine.get_circle(*id).is_ok())
            .collect()
    }

    fn pick_live(&self, rng: &mut StdRng) -> Option<CircleId> {
        let live = self.live();
        if live.is_empty() {
            None
        } else {
            Some(live[rng.gen_range(0..live.len())])
        }
    }

    fn step(&mut self, rng: &mut StdRng) {
        match rng.gen_range(0..100) {
            0..=54 => self.random_deposit(rng),
            55..=74 => self.random_withdraw(rng),
            75..=79 => self.random_decommission(rng),
            80..=82 => self.spawn_circle(rng),
            _ => self.fx.clock.advance(rng.gen_range(0..DAY / 2)),
        }
    }

    fn random_deposit(&mut self, rng: &mut StdRng) {
        let Some(id) = self.pick_live(rng) else { return };
        let circle = self.fx.engine.get_circle(id).unwrap();
        let payer = circle.members[rng.gen_range(0..circle.members.len())];
        let beneficiary = circle.members[rng.gen_range(0..circle.members.len())];
        let held = self.balance_of(id, beneficiary);
        let missing = circle.deposit_amount - held;
        let amount = if rng.gen_bool(0.6) {
            missing
        } else {
            dec(rng.gen_range(0..=60))
        };

        match self.fx.engine.deposit(payer, id, amount, beneficiary) {
            Ok(()) => assert!(held + amount <= circle.deposit_amount),
            Err(RoscaError::ExceedsDepositAmount { .. }) => {
                assert!(held + amount > circle.deposit_amount);
            }
            Err(RoscaError::TransferFailed { .. }) => {
                assert!(self.fx.wallet(payer) < amount);
            }
            Err(err) => assert!(err.is_timing(), "unexpected deposit error: {err}"),
        }
    }

    fn random_withdraw(&mut self, rng: &mut StdRng) {
        let Some(id) = self.pick_live(rng) else { return };
        let before = self.fx.engine.get_circle(id).unwrap();
        let balances = self.fx.balances(id);
        let recipient = before.members[before.current_index];
        let caller = before.members[rng.gen_range(0..before.members.len())];
        let wallet = self.fx.wallet(recipient);
        let withdrawable = self.fx.engine.is_withdrawable(id);

        match self.fx.engine.withdraw(caller, id, recipient) {
            Ok(()) => {
                assert!(withdrawable);
                assert!(balances.iter().all(|b| *b == before.deposit_amount));
                assert!(self.fx.clock.now() >= before.window_close());

                let after = self.fx.engine.get_circle(id).unwrap();
                assert_eq!(after.current_index, before.next_index());
                assert!(self.fx.balances(id).iter().all(Decimal::is_zero));
                assert_eq!(
                    self.fx.wallet(recipient),
                    wallet + before.payout_amount().unwrap()
                );
            }
            Err(err) => {
                assert!(!withdrawable);
                assert_eq!(err, RoscaError::NotWithdrawable(id));
                assert_eq!(self.fx.balances(id), balances);
            }
        }
    }

    fn random_decommission(&mut self, rng: &mut StdRng) {
        let Some(id) = self.pick_live(rng) else { return };
        let circle = self.fx.engine.get_circle(id).unwrap();
        let caller = circle.members[rng.gen_range(0..circle.members.len())];
        match self.fx.engine.decommission(caller, id) {
            Ok(()) => assert!(self.fx.engine.get_circle(id).is_err()),
            Err(err) => {
                assert_ne!(caller, circle.owner);
                assert_eq!(err, RoscaError::NotDecommissionable(id));
            }
        }
    }

    fn balance_of(&self, id: CircleId, who: Address) -> Decimal {
        self.fx
            .engine
            .get_member_balances(id)
            .unwrap()
            .into_iter()
            .find(|(m, _)| *m == who)
            .map_or(Decimal::ZERO, |(_, b)| b)
    }

    fn check_invariants(&self) {
        let mut held = Decimal::ZERO;
        for id in self.live() {
            let circle = self.fx.engine.get_circle(id).unwrap();
            assert!(circle.current_index < circle.members.len());

            let balances = self.fx.balances(id);
            assert!(balances.iter().all(|b| *b <= circle.deposit_amount));
            let sum: Decimal = balances.iter().sum();
            assert!(sum <= circle.payout_amount().unwrap());
            held += sum;
        }

        // The pool holds exactly what the open rounds have collected.
        assert_eq!(self.fx.pool_balance(), held);

        // Value is neither created nor destroyed.
        let wallets: Decimal = self.members.iter().map(|m| self.fx.wallet(*m)).sum();
        assert_eq!(wallets + self.fx.pool_balance(), self.minted);

        // Every circle ever created stays in each member's history.
        for (id, group) in &self.circles {
            for member in group {
                assert!(self.fx.engine.get_member_circles(member).contains(id));
            }
        }
    }
}

fn run(seed: u64, steps: usize) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut world = World::new(&mut rng);
    for _ in 0..steps {
        world.step(&mut rng);
        world.check_invariants();
    }
    world.fx.engine.verify_notifications().unwrap();
    assert_eq!(
        world.fx.engine.circle_count(),
        world.circles.len() as u64
    );
}

#[test]
fn random_operations_preserve_invariants() {
    for seed in [1, 7, 42, 1337] {
        run(seed, 1_500);
    }
}

#[test]
fn long_random_run_preserves_invariants() {
    run(0x005e_ed00, 5_000);
}
