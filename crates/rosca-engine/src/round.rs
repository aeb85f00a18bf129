//! Round rules: deposit window, per-round capacity, withdrawal eligibility.
//!
//! These are pure functions over a [`Circle`] and the [`BalanceLedger`];
//! the engine applies them under the circle's guard and performs the
//! transfers.
//!
//! Round `k` accepts deposits in `[open_k, close_k)` and becomes payable
//! from `close_k` on, once every member has reached the fixed contribution.

use rosca_types::{Address, Circle, CircleId, Result, RoscaError, Timestamp};
use rust_decimal::Decimal;

use crate::ledger::BalanceLedger;

/// Timing checks for a deposit, in order.
///
/// # Errors
/// `DepositBeforeCircleStart`, `DepositWindowClosed` or `CircleExpired`.
pub fn check_deposit_window(circle: &Circle, now: Timestamp) -> Result<()> {
    if now < circle.circle_start {
        return Err(RoscaError::DepositBeforeCircleStart);
    }
    if now >= circle.window_close() {
        return Err(RoscaError::DepositWindowClosed);
    }
    if now >= circle.expiry() {
        return Err(RoscaError::CircleExpired);
    }
    Ok(())
}

/// A member's running total for the round may reach, but never pass, the
/// fixed contribution. Returns the new running total.
///
/// # Errors
/// `ExceedsDepositAmount` when `balance + amount > deposit_amount`.
pub fn check_capacity(circle: &Circle, balance: Decimal, amount: Decimal) -> Result<Decimal> {
    match balance.checked_add(amount) {
        Some(total) if total <= circle.deposit_amount => Ok(total),
        _ => Err(RoscaError::ExceedsDepositAmount {
            balance,
            amount,
            limit: circle.deposit_amount,
        }),
    }
}

/// The window has elapsed and every member has paid in full.
#[must_use]
pub fn is_round_complete(
    circle_id: CircleId,
    circle: &Circle,
    ledger: &BalanceLedger,
    now: Timestamp,
) -> bool {
    now >= circle.window_close()
        && ledger.all_reached(circle_id, &circle.members, circle.deposit_amount)
}

/// Whether the current recipient could be paid right now.
#[must_use]
pub fn is_withdrawable(
    circle_id: CircleId,
    circle: &Circle,
    ledger: &BalanceLedger,
    now: Timestamp,
) -> bool {
    circle.round() < circle.max_deposits && is_round_complete(circle_id, circle, ledger, now)
}

/// Full eligibility check for paying `for_member`.
///
/// # Errors
/// `NotWithdrawable` if the round is incomplete, the rounds are exhausted,
/// or `for_member` is not the member whose turn it is.
pub fn check_withdraw(
    circle_id: CircleId,
    circle: &Circle,
    ledger: &BalanceLedger,
    for_member: &Address,
    now: Timestamp,
) -> Result<()> {
    let is_turn = circle.current_recipient().as_ref() == Some(for_member);
    if is_turn && is_withdrawable(circle_id, circle, ledger, now) {
        Ok(())
    } else {
        Err(RoscaError::NotWithdrawable(circle_id))
    }
}
