//! Axum router construction for the API server.
//!
//! Assembles all routes (REST + SSE feed) into a single [`Router`] behind
//! the API-key middleware, with CORS enabled for cross-origin dashboard
//! access and request tracing on every route.

use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{auth, events, feed, points, users};

/// Build the complete Axum router for the API server.
///
/// The router includes:
/// - `GET|POST /points`, `GET|DELETE /points/{id}`
/// - `GET /points/{id}/leaderboard`, `GET /points/{id}/events`
/// - `GET|POST /users`, `GET /users/{id}`, `GET /users/{id}/events`
/// - `GET|POST /events`, `PUT|DELETE /events/{id}`
/// - `GET /feed` -- live SSE stream
/// - `GET /stats` -- global totals
///
/// Every route requires the pre-shared API key. CORS allows any origin for
/// development; restrict it in production.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Point types
        .route("/points", get(points::list_points).post(points::create_point))
        .route(
            "/points/{id}",
            get(points::get_point).delete(points::delete_point),
        )
        .route("/points/{id}/leaderboard", get(points::get_point_leaderboard))
        .route("/points/{id}/events", get(points::get_point_events))
        // Users
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/{id}", get(users::get_user))
        .route("/users/{id}/events", get(users::get_user_events))
        // Events
        .route("/events", get(events::list_events).post(events::create_events))
        .route(
            "/events/{id}",
            put(events::update_event).delete(events::delete_event),
        )
        // Feed + stats
        .route("/feed", get(feed::feed))
        .route("/stats", get(feed::get_stats))
        // Auth applies to every route above.
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::require_api_key,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
