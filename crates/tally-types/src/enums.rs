//! Enumeration types for the Tally point service.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Event kind
// ---------------------------------------------------------------------------

/// The direction of a ledger event.
///
/// `Add` credits the balance by the recorded amount; `Remove` debits it.
/// Removals are clamped to the available balance at apply time, so a
/// `Remove` event's recorded amount may be smaller than what the caller
/// requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Credit points to a balance.
    Add,
    /// Debit points from a balance (clamped, never below zero at apply time).
    Remove,
}

impl EventKind {
    /// Apply the kind's sign to an unsigned amount.
    ///
    /// Amounts beyond `i64::MAX` saturate rather than wrap.
    pub fn signed(self, amount: u64) -> i64 {
        let magnitude = i64::try_from(amount).unwrap_or(i64::MAX);
        match self {
            Self::Add => magnitude,
            Self::Remove => magnitude.saturating_neg(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sort order
// ---------------------------------------------------------------------------

/// Ranking direction for leaderboard queries.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Lowest score first.
    Asc,
    /// Highest score first (the default for leaderboards).
    #[default]
    Desc,
}
