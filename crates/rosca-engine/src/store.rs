//! Circle arena and creation-time validation.
//!
//! Circles live in a `Vec<Option<Circle>>` indexed by [`CircleId`]. A
//! decommissioned circle leaves a vacant slot behind, so identifiers are
//! never reused and the arena only grows.

use rosca_types::{Circle, CircleId, Result, RoscaError, constants::MIN_MEMBERS};

use crate::registry::TokenRegistry;

/// Check an unsaved circle, in order, stopping at the first failure.
///
/// # Errors
/// One distinct validation error per rule; see [`RoscaError`] 1xx.
pub fn validate_circle(circle: &Circle, registry: &TokenRegistry) -> Result<()> {
    if !registry.is_allowed(&circle.token) {
        return Err(RoscaError::TokenNotAllowed(circle.token));
    }
    if circle.deposit_interval == 0 {
        return Err(RoscaError::InvalidDepositInterval);
    }
    if circle.deposit_amount <= rust_decimal::Decimal::ZERO {
        return Err(RoscaError::InvalidDepositAmount(circle.deposit_amount));
    }
    if circle.max_deposits == 0 {
        return Err(RoscaError::InvalidMaxDeposits);
    }
    if circle.circle_start.is_zero() {
        return Err(RoscaError::InvalidCircleStartTime);
    }
    if circle.current_index != 0 {
        return Err(RoscaError::InvalidCurrentIndex(circle.current_index));
    }
    if circle.owner.is_zero() {
        return Err(RoscaError::InvalidOwner);
    }
    if circle.members.len() < MIN_MEMBERS {
        return Err(RoscaError::InvalidMemberCount(circle.members.len()));
    }
    // Duplicates are accepted: one identity may hold several rotation slots.
    if let Some(pos) = circle.members.iter().position(|m| m.is_zero()) {
        return Err(RoscaError::InvalidMemberAddress(pos));
    }
    Ok(())
}

/// Authoritative set of circles.
#[derive(Debug, Default)]
pub struct CircleStore {
    circles: Vec<Option<Circle>>,
}

impl CircleStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Persist a validated circle under the next identifier.
    pub fn insert(&mut self, circle: Circle) -> CircleId {
        let id = self.next_id();
        self.circles.push(Some(circle));
        id
    }

    /// The identifier the next insert will receive.
    #[must_use]
    pub fn next_id(&self) -> CircleId {
        CircleId(self.count())
    }

    /// Number of identifiers ever assigned, including deleted circles.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.circles.len() as u64
    }

    #[must_use]
    pub fn get(&self, id: CircleId) -> Option<&Circle> {
        let slot = usize::try_from(id.0).ok()?;
        self.circles.get(slot)?.as_ref()
    }

    pub fn get_mut(&mut self, id: CircleId) -> Option<&mut Circle> {
        let slot = usize::try_from(id.0).ok()?;
        self.circles.get_mut(slot)?.as_mut()
    }

    /// Delete a circle, leaving its identifier retired.
    pub fn remove(&mut self, id: CircleId) -> Option<Circle> {
        let slot = usize::try_from(id.0).ok()?;
        self.circles.get_mut(slot)?.take()
    }
}
