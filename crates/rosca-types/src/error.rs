//! Error types for the Rosca engine.
//!
//! All errors use the `RS_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by category:
//! - 1xx: Validation errors (circle parameters, amounts)
//! - 2xx: Authorization errors
//! - 3xx: Timing errors
//! - 4xx: Capacity errors
//! - 5xx: External token errors
//! - 6xx: Existence errors
//! - 7xx: Concurrency errors
//! - 9xx: General / internal errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{Address, CircleId, TokenId};

/// Central error enum for all Rosca operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoscaError {
    // =================================================================
    // Validation Errors (1xx)
    // =================================================================
    /// The circle's token is not on the allow-list.
    #[error("RS_ERR_100: Token not allowed: {0}")]
    TokenNotAllowed(TokenId),

    /// The deposit interval is zero.
    #[error("RS_ERR_101: Invalid deposit interval")]
    InvalidDepositInterval,

    /// The per-round deposit amount is not positive.
    #[error("RS_ERR_102: Invalid deposit amount: {0}")]
    InvalidDepositAmount(Decimal),

    /// The maximum number of rounds is zero.
    #[error("RS_ERR_103: Invalid max deposits")]
    InvalidMaxDeposits,

    /// The circle start time is zero.
    #[error("RS_ERR_104: Invalid circle start time")]
    InvalidCircleStartTime,

    /// A new circle must start at the head of the rotation.
    #[error("RS_ERR_105: Invalid current index: {0}")]
    InvalidCurrentIndex(usize),

    /// The owner is the zero identity.
    #[error("RS_ERR_106: Invalid owner")]
    InvalidOwner,

    /// Fewer than two members.
    #[error("RS_ERR_107: Invalid member count: {0}")]
    InvalidMemberCount(usize),

    /// A member is the zero identity.
    #[error("RS_ERR_108: Invalid member address at position {0}")]
    InvalidMemberAddress(usize),

    /// A deposit amount is negative.
    #[error("RS_ERR_109: Invalid amount: {0}")]
    InvalidAmount(Decimal),

    // =================================================================
    // Authorization Errors (2xx)
    // =================================================================
    /// The caller is not the service administrator.
    #[error("RS_ERR_200: Caller {0} is not the administrator")]
    NotAdministrator(Address),

    /// The caller (or beneficiary) is not a member of the circle.
    #[error("RS_ERR_201: {member} is not a member of {circle_id}")]
    NotMember { circle_id: CircleId, member: Address },

    /// The caller may not decommission the circle right now.
    #[error("RS_ERR_202: {0} is not decommissionable by this caller")]
    NotDecommissionable(CircleId),

    // =================================================================
    // Timing Errors (3xx)
    // =================================================================
    /// The circle's first round has not opened yet.
    #[error("RS_ERR_300: Deposit before circle start")]
    DepositBeforeCircleStart,

    /// The current round's deposit window has closed.
    #[error("RS_ERR_301: Deposit window closed")]
    DepositWindowClosed,

    /// The circle has run past its last round.
    #[error("RS_ERR_302: Circle expired")]
    CircleExpired,

    /// The round is not complete, or the beneficiary is not up next.
    #[error("RS_ERR_303: {0} is not withdrawable")]
    NotWithdrawable(CircleId),

    // =================================================================
    // Capacity Errors (4xx)
    // =================================================================
    /// The deposit would push the member past the fixed contribution.
    #[error("RS_ERR_400: Deposit exceeds amount: balance {balance} + {amount} > {limit}")]
    ExceedsDepositAmount {
        balance: Decimal,
        amount: Decimal,
        limit: Decimal,
    },

    // =================================================================
    // External Token Errors (5xx)
    // =================================================================
    /// The token capability reported failure.
    #[error("RS_ERR_500: Token transfer failed: {token} {amount} to {to}")]
    TransferFailed {
        token: TokenId,
        to: Address,
        amount: Decimal,
    },

    // =================================================================
    // Existence Errors (6xx)
    // =================================================================
    /// No circle with this identifier exists.
    #[error("RS_ERR_600: Circle not commissioned: {0}")]
    NotCommissioned(CircleId),

    // =================================================================
    // Concurrency Errors (7xx)
    // =================================================================
    /// A mutating call re-entered a circle that is mid-operation.
    #[error("RS_ERR_700: Re-entrant call on {0}")]
    ReentrantCall(CircleId),

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Amount arithmetic left the representable range.
    #[error("RS_ERR_900: Arithmetic overflow: {0}")]
    ArithmeticOverflow(String),

    /// Serialization / deserialization error.
    #[error("RS_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("RS_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// The notification log digest chain does not verify.
    #[error("RS_ERR_903: Integrity violation: {0}")]
    IntegrityViolation(String),
}

impl RoscaError {
    /// The numeric code embedded in the message, e.g. `301`.
    #[must_use]
    pub fn code(&self) -> u16 {
        match self {
            Self::TokenNotAllowed(_) => 100,
            Self::InvalidDepositInterval => 101,
            Self::InvalidDepositAmount(_) => 102,
            Self::InvalidMaxDeposits => 103,
            Self::InvalidCircleStartTime => 104,
            Self::InvalidCurrentIndex(_) => 105,
            Self::InvalidOwner => 106,
            Self::InvalidMemberCount(_) => 107,
            Self::InvalidMemberAddress(_) => 108,
            Self::InvalidAmount(_) => 109,
            Self::NotAdministrator(_) => 200,
            Self::NotMember { .. } => 201,
            Self::NotDecommissionable(_) => 202,
            Self::DepositBeforeCircleStart => 300,
            Self::DepositWindowClosed => 301,
            Self::CircleExpired => 302,
            Self::NotWithdrawable(_) => 303,
            Self::ExceedsDepositAmount { .. } => 400,
            Self::TransferFailed { .. } => 500,
            Self::NotCommissioned(_) => 600,
            Self::ReentrantCall(_) => 700,
            Self::ArithmeticOverflow(_) => 900,
            Self::Serialization(_) => 901,
            Self::Configuration(_) => 902,
            Self::IntegrityViolation(_) => 903,
        }
    }

    /// Timing errors may succeed later; every other category needs the
    /// caller to change something.
    #[must_use]
    pub fn is_timing(&self) -> bool {
        (300..400).contains(&self.code())
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, RoscaError>;

impl From<serde_json::Error> for RoscaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
