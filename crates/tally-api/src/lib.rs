//! API server for the Tally point service.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **REST endpoints** for point types, users, events, leaderboards, and
//!   global stats
//! - **An SSE feed** (`GET /feed`) pushing every accepted mutation and the
//!   refreshed stats to live subscribers via [`tokio::sync::broadcast`]
//! - **API-key authentication** on every route, via header or query
//!   parameter
//!
//! # Architecture
//!
//! Handlers are thin: they resolve pagination and filters, call the
//! [`tally_engine::LedgerEngine`], and shape the wire envelopes. All
//! consistency guarantees live in the engine; the API layer never touches
//! the stores directly.

pub mod auth;
pub mod error;
pub mod events;
pub mod feed;
mod pagination;
pub mod points;
pub mod router;
pub mod server;
pub mod state;
pub mod users;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{start_server, ServerConfig, ServerError};
pub use state::AppState;
