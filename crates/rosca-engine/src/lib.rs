//! # rosca-engine
//!
//! Circle lifecycle and round accounting for rotating savings circles.
//!
//! ## Architecture
//!
//! - **TokenRegistry**: administrator-controlled allow-list of token types
//! - **CircleStore**: arena of circles keyed by sequential [`CircleId`]s
//! - **MembershipIndex**: participant → circles, plus an O(1) membership test
//! - **BalanceLedger**: what each member has paid into the current round
//! - **round**: deposit window, capacity and withdrawal eligibility rules
//! - **decommission**: early termination rules and the refund plan
//! - **ReentrancyGuard**: per-circle scoped exclusion around external transfers
//! - **NotificationLog**: append-only, digest-chained consumer log
//! - **RoscaEngine**: the facade that serializes all of the above
//!
//! ## Request Flow
//!
//! ```text
//! create       → TokenRegistry → CircleStore → MembershipIndex → NotificationLog
//! deposit      → guard → round rules → transfer_from → BalanceLedger → NotificationLog
//! withdraw     → guard → round rules → transfer → BalanceLedger reset → NotificationLog
//! decommission → guard → decommission rules → refund, zero (each) → CircleStore delete
//! ```
//!
//! [`CircleId`]: rosca_types::CircleId

pub mod decommission;
pub mod engine;
pub mod guard;
pub mod ledger;
pub mod membership;
pub mod notifications;
pub mod registry;
pub mod round;
pub mod store;

pub use engine::RoscaEngine;
pub use guard::{CircleGuard, ReentrancyGuard};
pub use ledger::BalanceLedger;
pub use membership::MembershipIndex;
pub use notifications::{NotificationLog, NotificationRecord, verify_records};
pub use registry::TokenRegistry;
pub use store::{CircleStore, validate_circle};
