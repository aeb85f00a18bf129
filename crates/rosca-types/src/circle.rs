//! The circle record and its round arithmetic.
//!
//! Round `k` of a circle owns the window
//! `[circle_start + k * interval, circle_start + (k + 1) * interval)`.
//! The circle expires at `circle_start + max_deposits * interval`.
//! All deadline arithmetic saturates, so an absurd interval simply pushes
//! the deadline to the end of time.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Address, Timestamp, TokenId};

/// One rotating-pool agreement among a fixed, ordered set of members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circle {
    /// Identity that created the circle.
    pub owner: Address,
    /// Rotation order. Fixed at creation.
    pub members: Vec<Address>,
    /// Whose turn it is to receive the pool.
    pub current_index: usize,
    /// Fixed contribution each member must reach per round.
    pub deposit_amount: Decimal,
    /// Token used for every deposit and payout.
    pub token: TokenId,
    /// Length of one round's deposit window, in seconds.
    pub deposit_interval: u64,
    /// When round 0 opens.
    pub circle_start: Timestamp,
    /// Upper bound on the number of rounds.
    pub max_deposits: u64,
}

/// The current round's window, as seen from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSchedule {
    /// Zero-based round number (equals the rotation index).
    pub round: u64,
    /// Deposits are accepted from here on.
    pub opens_at: Timestamp,
    /// Deposits stop and withdrawal becomes possible.
    pub closes_at: Timestamp,
    /// No deposits are accepted at or after this instant.
    pub expires_at: Timestamp,
}

impl Circle {
    /// The current rotation index as a round number.
    #[must_use]
    pub fn round(&self) -> u64 {
        u64::try_from(self.current_index).unwrap_or(u64::MAX)
    }

    /// `circle_start + interval * rounds`, saturating.
    #[must_use]
    pub fn deadline(&self, rounds: u64) -> Timestamp {
        self.circle_start
            .saturating_add(self.deposit_interval.saturating_mul(rounds))
    }

    /// When the current round's window closes.
    #[must_use]
    pub fn window_close(&self) -> Timestamp {
        self.deadline(self.round().saturating_add(1))
    }

    /// When the circle runs out of rounds.
    #[must_use]
    pub fn expiry(&self) -> Timestamp {
        self.deadline(self.max_deposits)
    }

    #[must_use]
    pub fn schedule(&self) -> RoundSchedule {
        RoundSchedule {
            round: self.round(),
            opens_at: self.deadline(self.round()),
            closes_at: self.window_close(),
            expires_at: self.expiry(),
        }
    }

    /// The member whose turn it is.
    #[must_use]
    pub fn current_recipient(&self) -> Option<Address> {
        self.members.get(self.current_index).copied()
    }

    /// Full pool for one round: `deposit_amount * members.len()`.
    #[must_use]
    pub fn payout_amount(&self) -> Option<Decimal> {
        self.deposit_amount
            .checked_mul(Decimal::from(self.members.len()))
    }

    /// Index of the next rotation slot.
    #[must_use]
    pub fn next_index(&self) -> usize {
        if self.members.is_empty() {
            0
        } else {
            (self.current_index + 1) % self.members.len()
        }
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl Circle {
    /// A valid circle fixture: one-day interval, 1000 rounds, the owner is
    /// the first member.
    pub fn dummy(
        members: Vec<Address>,
        token: TokenId,
        deposit_amount: Decimal,
        start: Timestamp,
    ) -> Self {
        Self {
            owner: members.first().copied().unwrap_or(Address::ZERO),
            members,
            current_index: 0,
            deposit_amount,
            token,
            deposit_interval: crate::constants::SECONDS_PER_DAY,
            circle_start: start,
            max_deposits: 1000,
        }
    }
}
