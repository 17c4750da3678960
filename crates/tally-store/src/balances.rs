//! The balance table: current points per (user, point type) pair.
//!
//! Single source of truth for "how many points does X have." Every other
//! ranked or aggregated view is derived from the deltas applied here. The
//! table also remembers which pairs have already been credited toward their
//! point type's `user_count`, so the denormalized counter is bumped exactly
//! once per pair.
//!
//! Balances are signed: `apply_event` clamps removals so it never drives a
//! balance below zero, but an amendment is an authoritative correction that
//! deliberately skips the clamp and may leave a pair negative.

use std::collections::{BTreeMap, BTreeSet};

use tally_types::{PointTypeId, UserId};

/// Key of one balance cell.
pub type PairKey = (UserId, PointTypeId);

/// Current balance per (user, point type) pair.
#[derive(Debug, Default)]
pub struct BalanceTable {
    /// Balance cells. A cell exists for every pair with recorded history,
    /// even when the balance is zero.
    balances: BTreeMap<PairKey, i64>,
    /// Pairs already counted toward their point type's `user_count`.
    credited: BTreeSet<PairKey>,
}

impl BalanceTable {
    /// Create an empty balance table.
    pub const fn new() -> Self {
        Self {
            balances: BTreeMap::new(),
            credited: BTreeSet::new(),
        }
    }

    /// Current balance for a pair, defaulting to 0 when the pair has no
    /// recorded history.
    pub fn get(&self, user_id: &UserId, point_id: &PointTypeId) -> i64 {
        self.balances
            .get(&(user_id.clone(), point_id.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Whether the pair has any recorded history (including a zero balance).
    pub fn touched(&self, user_id: &UserId, point_id: &PointTypeId) -> bool {
        self.balances
            .contains_key(&(user_id.clone(), point_id.clone()))
    }

    /// Apply a signed delta to a pair and return the new balance.
    ///
    /// Creates the cell if absent, so even a fully-clamped removal (delta 0)
    /// marks the pair as touched.
    pub fn apply_delta(&mut self, user_id: &UserId, point_id: &PointTypeId, delta: i64) -> i64 {
        let cell = self
            .balances
            .entry((user_id.clone(), point_id.clone()))
            .or_insert(0);
        *cell = cell.saturating_add(delta);
        *cell
    }

    /// Mark the pair as credited toward its point type's `user_count`.
    ///
    /// Returns `true` the first time a pair is credited, `false` on every
    /// later call. The caller bumps the denormalized counter only on `true`.
    pub fn credit_first_add(&mut self, user_id: &UserId, point_id: &PointTypeId) -> bool {
        self.credited.insert((user_id.clone(), point_id.clone()))
    }

    /// All balances recorded for one user, keyed by point type.
    pub fn balances_for_user(&self, user_id: &UserId) -> BTreeMap<PointTypeId, i64> {
        self.balances
            .iter()
            .filter(|((user, _), _)| user == user_id)
            .map(|((_, point), balance)| (point.clone(), *balance))
            .collect()
    }

    /// Drop every cell and credit mark belonging to a point type.
    ///
    /// Returns the number of cells removed.
    pub fn purge_point_type(&mut self, point_id: &PointTypeId) -> usize {
        let before = self.balances.len();
        self.balances.retain(|(_, point), _| point != point_id);
        self.credited.retain(|(_, point)| point != point_id);
        before.saturating_sub(self.balances.len())
    }

    /// Number of pairs with recorded history.
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    /// Whether no pair has recorded history.
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}
