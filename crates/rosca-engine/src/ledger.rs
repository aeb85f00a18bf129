//! Per-round balance ledger.
//!
//! Tracks what each member has paid into the *current* round of each
//! circle. A row is dropped wholesale when the round is paid out, which is
//! how every balance returns to zero at once.

use std::collections::HashMap;

use rosca_types::{Address, CircleId};
use rust_decimal::Decimal;

#[derive(Debug, Default)]
pub struct BalanceLedger {
    rows: HashMap<CircleId, HashMap<Address, Decimal>>,
}

impl BalanceLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn balance(&self, circle_id: CircleId, member: &Address) -> Decimal {
        self.rows
            .get(&circle_id)
            .and_then(|row| row.get(member))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Overwrite a single balance. Zero removes the entry.
    pub fn set(&mut self, circle_id: CircleId, member: Address, amount: Decimal) {
        if amount.is_zero() {
            if let Some(row) = self.rows.get_mut(&circle_id) {
                row.remove(&member);
            }
        } else {
            self.rows.entry(circle_id).or_default().insert(member, amount);
        }
    }

    /// Balances of `members`, in the order given.
    #[must_use]
    pub fn balances_of(&self, circle_id: CircleId, members: &[Address]) -> Vec<Decimal> {
        members.iter().map(|m| self.balance(circle_id, m)).collect()
    }

    /// Whether every listed member has reached `target`.
    #[must_use]
    pub fn all_reached(&self, circle_id: CircleId, members: &[Address], target: Decimal) -> bool {
        members.iter().all(|m| self.balance(circle_id, m) >= target)
    }

    /// Zero every balance of a circle.
    pub fn clear_round(&mut self, circle_id: CircleId) {
        self.rows.remove(&circle_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    #[test]
    fn balances_are_per_circle() {
        let mut ledger = BalanceLedger::new();
        let a = Address::from_low_u64(1);
        ledger.set(CircleId(0), a, dec(60));
        assert_eq!(ledger.balance(CircleId(0), &a), dec(60));
        assert_eq!(ledger.balance(CircleId(1), &a), Decimal::ZERO);
    }

    #[test]
    fn clear_round_zeroes_every_member() {
        let mut ledger = BalanceLedger::new();
        let a = Address::from_low_u64(1);
        let b = Address::from_low_u64(2);
        ledger.set(CircleId(0), a, dec(10));
        ledger.set(CircleId(0), b, dec(20));
        ledger.set(CircleId(1), a, dec(5));
        assert_eq!(ledger.balances_of(CircleId(0), &[a, b]), vec![dec(10), dec(20)]);

        ledger.clear_round(CircleId(0));
        assert_eq!(ledger.balances_of(CircleId(0), &[a, b]), vec![Decimal::ZERO; 2]);
        assert_eq!(ledger.balance(CircleId(1), &a), dec(5));
    }

    #[test]
    fn all_reached_requires_every_member() {
        let mut ledger = BalanceLedger::new();
        let a = Address::from_low_u64(1);
        let b = Address::from_low_u64(2);
        ledger.set(CircleId(0), a, dec(100));
        assert!(!ledger.all_reached(CircleId(0), &[a, b], dec(100)));
        ledger.set(CircleId(0), b, dec(100));
        assert!(ledger.all_reached(CircleId(0), &[a, b], dec(100)));
    }

    #[test]
    fn set_zero_removes_entry() {
        let mut ledger = BalanceLedger::new();
        let a = Address::from_low_u64(1);
        ledger.set(CircleId(0), a, dec(5));
        ledger.set(CircleId(0), a, Decimal::ZERO);
        assert!(ledger.rows[&CircleId(0)].is_empty());
        // Zeroing an unknown circle creates nothing.
        ledger.set(CircleId(9), a, Decimal::ZERO);
        assert!(!ledger.rows.contains_key(&CircleId(9)));
    }
}
