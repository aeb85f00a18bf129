//! # rosca-types
//!
//! Shared types, errors, and configuration for the **Rosca** rotating savings
//! circle engine.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`Address`], [`TokenId`], [`CircleId`]
//! - **Time**: [`Timestamp`], the [`Clock`] boundary and [`SystemClock`]
//! - **Circle model**: [`Circle`], [`RoundSchedule`]
//! - **Notifications**: [`Notification`]
//! - **Token boundary**: [`TokenTransfer`]
//! - **Configuration**: [`EngineConfig`]
//! - **Errors**: [`RoscaError`] with `RS_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod circle;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod notification;
pub mod token;

// Re-export all primary types at crate root for ergonomic imports:
//   use rosca_types::{Address, Circle, CircleId, RoscaError, ...};

pub use circle::*;
pub use clock::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use notification::*;
pub use token::*;

// Constants are accessed via `rosca_types::constants::FOO`
// (not re-exported to avoid name collisions).
