//! Typed identifier wrappers for the Tally domain.
//!
//! User and point-type identifiers are assigned by external callers (Discord
//! snowflakes, community slugs, arbitrary opaque strings) and are therefore
//! wrapped strings, not UUIDs. Event identifiers are generated by the engine
//! and use UUID v7 (time-ordered).

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around an externally-assigned [`String`] id.
macro_rules! define_str_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Wrap a raw identifier value.
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Return the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the inner [`String`].
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self(raw)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self(raw.to_owned())
            }
        }
    };
}

define_str_id! {
    /// Unique identifier for a user, assigned by the caller (or implied by
    /// the first event that references it).
    UserId
}

define_str_id! {
    /// Unique identifier for a point type, assigned at creation time.
    PointTypeId
}

/// Unique identifier for a ledger event.
///
/// Generated by the engine when an event is accepted. UUID v7 keeps ids
/// roughly time-ordered, which makes them a stable tie-breaker when two
/// events share a timestamp.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
#[serde(transparent)]
pub struct EventId(pub Uuid);

impl EventId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for EventId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for EventId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<EventId> for Uuid {
    fn from(id: EventId) -> Self {
        id.0
    }
}
