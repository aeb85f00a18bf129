//! Consumer-facing notifications emitted by state-mutating operations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Address, CircleId, TokenId};

/// One entry of the append-only notification log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// A circle passed validation and was assigned an identifier.
    CircleCreated {
        circle_id: CircleId,
        members: Vec<Address>,
        token: TokenId,
        deposit_amount: Decimal,
        deposit_interval: u64,
    },
    /// A circle was terminated early and its record deleted.
    CircleDecommissioned { circle_id: CircleId },
    /// `depositor` paid `amount` toward `member`'s contribution.
    FundsDeposited {
        circle_id: CircleId,
        depositor: Address,
        member: Address,
        amount: Decimal,
    },
    /// The pool was paid out to `member`.
    FundsWithdrawn {
        circle_id: CircleId,
        member: Address,
        amount: Decimal,
    },
    /// The administrator changed a token's allow-list flag.
    TokenAllowanceChanged { token: TokenId, allowed: bool },
}

impl Notification {
    /// The circle this notification concerns, if any.
    #[must_use]
    pub fn circle_id(&self) -> Option<CircleId> {
        match self {
            Self::CircleCreated { circle_id, .. }
            | Self::CircleDecommissioned { circle_id }
            | Self::FundsDeposited { circle_id, .. }
            | Self::FundsWithdrawn { circle_id, .. } => Some(*circle_id),
            Self::TokenAllowanceChanged { .. } => None,
        }
    }

    /// Short stable name, matches the serde tag.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CircleCreated { .. } => "circle_created",
            Self::CircleDecommissioned { .. } => "circle_decommissioned",
            Self::FundsDeposited { .. } => "funds_deposited",
            Self::FundsWithdrawn { .. } => "funds_withdrawn",
            Self::TokenAllowanceChanged { .. } => "token_allowance_changed",
        }
    }
}
