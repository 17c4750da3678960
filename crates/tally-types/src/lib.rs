//! Shared type definitions for the Tally point service.
//!
//! This crate is the single source of truth for the types used across the
//! Tally workspace. Types defined here flow downstream to `TypeScript` via
//! `ts-rs` for the dashboard frontend.
//!
//! # Modules
//!
//! - [`ids`] -- Typed identifier wrappers (string ids for users and point
//!   types, UUID v7 for events)
//! - [`enums`] -- Enumeration types (event kind, sort order)
//! - [`structs`] -- Entity structs (point types, users, events,
//!   leaderboard rows, stats) and query envelopes
//! - [`feed`] -- Live feed message types

pub mod enums;
pub mod feed;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{EventKind, SortOrder};
pub use feed::FeedMessage;
pub use ids::{EventId, PointTypeId, UserId};
pub use structs::{
    Event, EventFilter, LeaderboardEntry, LeaderboardQuery, Page, PointType, Stats, User,
    UserWithBalances,
};

#[cfg(test)]
mod tests {
    //! Trigger `TypeScript` binding generation for exported types.

    #[test]
    fn export_bindings() {
        // ts-rs writes the binding files to `bindings/` relative to the
        // crate root when export_all is invoked.
        use ts_rs::TS;

        let _ = crate::ids::UserId::export_all();
        let _ = crate::ids::PointTypeId::export_all();
        let _ = crate::ids::EventId::export_all();
        let _ = crate::enums::EventKind::export_all();
        let _ = crate::enums::SortOrder::export_all();
        let _ = crate::structs::PointType::export_all();
        let _ = crate::structs::User::export_all();
        let _ = crate::structs::UserWithBalances::export_all();
        let _ = crate::structs::Event::export_all();
        let _ = crate::structs::LeaderboardEntry::export_all();
        let _ = crate::structs::Stats::export_all();
        let _ = crate::feed::FeedMessage::export_all();
    }
}
