//! Participant → circle index.
//!
//! Built once per circle at creation. Entries are never removed, so a
//! participant's list doubles as a history that survives decommissioning.

use std::collections::{HashMap, HashSet};

use rosca_types::{Address, CircleId};

#[derive(Debug, Default)]
pub struct MembershipIndex {
    by_member: HashMap<Address, Vec<CircleId>>,
    pairs: HashSet<(CircleId, Address)>,
}

impl MembershipIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every member of a new circle. A member listed twice is
    /// indexed once.
    pub fn register(&mut self, circle_id: CircleId, members: &[Address]) {
        for member in members {
            if self.pairs.insert((circle_id, *member)) {
                self.by_member.entry(*member).or_default().push(circle_id);
            }
        }
    }

    #[must_use]
    pub fn is_member(&self, circle_id: CircleId, who: &Address) -> bool {
        self.pairs.contains(&(circle_id, *who))
    }

    /// Circles `who` has ever belonged to, in creation order.
    #[must_use]
    pub fn circles_of(&self, who: &Address) -> &[CircleId] {
        self.by_member.get(who).map(Vec::as_slice).unwrap_or_default()
    }
}
