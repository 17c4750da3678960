//! The user registry: identity records in creation order.
//!
//! Users appear here two ways: an explicit creation call, or implicitly the
//! first time an event references an unseen id (display name defaulting to
//! the id). Either way the registry is the authority on "have we seen this
//! user before" -- the engine bumps the global distinct-user counter exactly
//! when an insert here reports a new id.

use chrono::{DateTime, Utc};
use tally_types::{Page, User, UserId};

/// All users ever seen.
#[derive(Debug, Default)]
pub struct UserRegistry {
    records: std::collections::BTreeMap<UserId, User>,
    /// Ids in creation order; drives stable paginated listing.
    creation_order: Vec<UserId>,
}

impl UserRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            records: std::collections::BTreeMap::new(),
            creation_order: Vec::new(),
        }
    }

    /// Register a user with an explicit display name.
    ///
    /// Returns `false` (and leaves the registry unchanged) when the id is
    /// already taken.
    pub fn insert(&mut self, user: User) -> bool {
        if self.records.contains_key(&user.user_id) {
            return false;
        }
        self.creation_order.push(user.user_id.clone());
        self.records.insert(user.user_id.clone(), user);
        true
    }

    /// Ensure a user exists, creating an implicit record when the id is new.
    ///
    /// Returns `true` when this call created the user.
    pub fn ensure(&mut self, user_id: &UserId, seen_at: DateTime<Utc>) -> bool {
        if self.records.contains_key(user_id) {
            return false;
        }
        self.insert(User {
            user_id: user_id.clone(),
            name: user_id.as_str().to_owned(),
            created_at: seen_at,
        })
    }

    /// Look up a user by id.
    pub fn get(&self, user_id: &UserId) -> Option<&User> {
        self.records.get(user_id)
    }

    /// Whether the user has ever been seen.
    pub fn contains(&self, user_id: &UserId) -> bool {
        self.records.contains_key(user_id)
    }

    /// Read one page of users in creation order.
    pub fn page(&self, limit: usize, offset: usize) -> Page<User> {
        Page {
            total: u64::try_from(self.records.len()).unwrap_or(u64::MAX),
            items: self
                .creation_order
                .iter()
                .skip(offset)
                .take(limit)
                .filter_map(|id| self.records.get(id))
                .cloned()
                .collect(),
            offset,
            limit,
        }
    }

    /// Number of users ever seen.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no users have been seen.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
