//! Core entity structs for the Tally point service.
//!
//! These are the shapes served over HTTP and pushed over the feed, so the
//! serde renames follow the wire contract (camelCase keys, `type` for the
//! event kind) rather than Rust field conventions.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{EventKind, SortOrder};
use crate::ids::{EventId, PointTypeId, UserId};

// ---------------------------------------------------------------------------
// Point type
// ---------------------------------------------------------------------------

/// A named category of points, tracked independently of all others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "camelCase")]
pub struct PointType {
    /// Externally-assigned identifier.
    pub point_id: PointTypeId,
    /// Display name.
    pub name: String,
    /// Reference to whoever created the point type.
    pub creator: String,
    /// Optional image shown next to the point type in the dashboard.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Optional community (guild) the point type belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<String>,
    /// When the point type was created.
    pub created_at: DateTime<Utc>,
    /// Distinct users with recorded point history for this type.
    ///
    /// Denormalized: incremented by the engine on a pair's first accepted
    /// `add` event, never decremented.
    pub user_count: u64,
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A user identity record.
///
/// Created explicitly via the users API, or implicitly when an event
/// references an identifier the system has never seen (in which case the
/// display name defaults to the identifier itself).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Externally-assigned identifier.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// When the user was first seen.
    pub created_at: DateTime<Utc>,
}

/// A user record joined with their current balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "camelCase")]
pub struct UserWithBalances {
    /// Externally-assigned identifier.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// When the user was first seen.
    pub created_at: DateTime<Utc>,
    /// Current balance per point type, for every pair with recorded history.
    pub points: BTreeMap<PointTypeId, i64>,
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// One signed adjustment to a user's balance in a point type.
///
/// The unit of history: balances, leaderboard scores, and counters are all
/// derived from the set of currently-existing events. Immutable except
/// through the engine's amend and delete operations, both of which apply a
/// compensating balance adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// System-generated identifier.
    pub id: EventId,
    /// The user whose balance the event adjusts.
    pub user_id: UserId,
    /// The point type the event belongs to.
    pub point_id: PointTypeId,
    /// Direction of the adjustment.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Recorded magnitude. For removals this is the clamped amount actually
    /// debited, which may be less than the caller requested.
    pub amount: u64,
    /// When the event was applied (refreshed on amendment).
    pub timestamp: DateTime<Utc>,
}

impl Event {
    /// The event's contribution to its pair's balance.
    pub fn signed_amount(&self) -> i64 {
        self.kind.signed(self.amount)
    }
}

// ---------------------------------------------------------------------------
// Leaderboard
// ---------------------------------------------------------------------------

/// One ranked row of a point type's leaderboard.
///
/// Derived, never stored independently: `points` always equals the user's
/// current balance for the point type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// The ranked user.
    pub user_id: UserId,
    /// The user's current score (== balance).
    pub points: i64,
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Global running totals.
///
/// All three are monotonic "ever seen" tallies: deleting an event or a
/// point type does not roll them back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Stats {
    /// Distinct users ever seen.
    pub users: u64,
    /// Events ever created.
    pub events: u64,
    /// Point types ever created.
    pub points: u64,
}

// ---------------------------------------------------------------------------
// Query envelopes
// ---------------------------------------------------------------------------

/// A page of results plus the information a pagination UI needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Total matching items before pagination.
    pub total: u64,
    /// The requested slice, in query order.
    pub items: Vec<T>,
    /// Offset the page was read at.
    pub offset: usize,
    /// Limit the page was read with.
    pub limit: usize,
}

/// Filters for event-log queries. All fields are optional and intersected
/// with AND semantics; an empty filter matches every event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Only events for this user.
    pub user_id: Option<UserId>,
    /// Only events for this point type.
    pub point_id: Option<PointTypeId>,
    /// Only events of this kind.
    pub kind: Option<EventKind>,
    /// Only events at or after this instant.
    pub start: Option<DateTime<Utc>>,
    /// Only events at or before this instant.
    pub end: Option<DateTime<Utc>>,
}

/// Parameters for a leaderboard page read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaderboardQuery {
    /// Maximum rows to return.
    pub limit: usize,
    /// Rows to skip from the top of the ranking.
    pub offset: usize,
    /// Ranking direction.
    pub order: SortOrder,
}
