//! Early termination rules.
//!
//! The owner may decommission at any time. Any other member may do so
//! only once the current round has stalled: its window has passed and at
//! least one member is still short of the fixed contribution.

use std::collections::HashSet;

use rosca_types::{Address, Circle, CircleId, Result, RoscaError, Timestamp};
use rust_decimal::Decimal;

use crate::ledger::BalanceLedger;

/// The current round's window has passed with someone short.
#[must_use]
pub fn is_stalled(
    circle_id: CircleId,
    circle: &Circle,
    ledger: &BalanceLedger,
    now: Timestamp,
) -> bool {
    now > circle.window_close()
        && !ledger.all_reached(circle_id, &circle.members, circle.deposit_amount)
}

/// Decide whether `caller` (already known to be a member) may
/// decommission.
///
/// # Errors
/// `NotDecommissionable` for a non-owner on a round that has not stalled.
pub fn authorize(
    circle_id: CircleId,
    circle: &Circle,
    caller: &Address,
    ledger: &BalanceLedger,
    now: Timestamp,
) -> Result<()> {
    if *caller == circle.owner || is_stalled(circle_id, circle, ledger, now) {
        Ok(())
    } else {
        Err(RoscaError::NotDecommissionable(circle_id))
    }
}

/// Non-zero balances to return, in rotation order, one entry per distinct
/// member.
#[must_use]
pub fn refund_plan(
    circle_id: CircleId,
    circle: &Circle,
    ledger: &BalanceLedger,
) -> Vec<(Address, Decimal)> {
    let mut seen = HashSet::new();
    circle
        .members
        .iter()
        .filter(|m| seen.insert(**m))
        .map(|m| (*m, ledger.balance(circle_id, m)))
        .filter(|(_, balance)| !balance.is_zero())
        .collect()
}
