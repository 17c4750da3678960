//! Point-type endpoints: listing, creation, detail, deletion, and the
//! per-type leaderboard and event views.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tally_engine::NewPointType;
use tally_types::{LeaderboardQuery, PointTypeId, SortOrder};
use validator::Validate;

use crate::error::ApiError;
use crate::events::{events_response, EventsQuery};
use crate::pagination;
use crate::state::AppState;

/// Default page size for point-type and leaderboard listings.
const DEFAULT_POINTS_LIMIT: usize = 100;

// ---------------------------------------------------------------------------
// Query and body types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /points`.
#[derive(Debug, Deserialize)]
pub struct PointsListQuery {
    /// Maximum point types to return.
    pub limit: Option<usize>,
    /// Point types to skip.
    pub offset: Option<usize>,
    /// Case-insensitive name substring filter.
    pub name: Option<String>,
}

/// Query parameters for `GET /points/{id}/leaderboard`.
#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    /// Maximum rows to return.
    pub limit: Option<usize>,
    /// Rows to skip from the top of the ranking.
    pub offset: Option<usize>,
    /// Ranking direction; highest-first when omitted.
    pub order: Option<SortOrder>,
}

/// Body of `POST /points`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePointBody {
    /// Externally-assigned identifier.
    pub point_id: PointTypeId,
    /// Display name.
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Reference to whoever is creating the point type.
    #[validate(length(min = 1, max = 100))]
    pub creator: String,
    /// Optional image reference.
    pub image_url: Option<String>,
    /// Optional community (guild) reference.
    pub guild_id: Option<String>,
}

// ---------------------------------------------------------------------------
// GET /points -- list point types
// ---------------------------------------------------------------------------

/// List point types in creation order, optionally filtered by name.
pub async fn list_points(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PointsListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (limit, offset) = pagination::clamp(params.limit, params.offset, DEFAULT_POINTS_LIMIT);
    let page = state
        .engine
        .list_point_types(limit, offset, params.name.as_deref())
        .await;

    Ok(Json(serde_json::json!({
        "total": page.total,
        "points": page.items,
        "offset": page.offset,
        "limit": page.limit,
    })))
}

// ---------------------------------------------------------------------------
// POST /points -- create a point type
// ---------------------------------------------------------------------------

/// Register a point type and return it with status 201.
pub async fn create_point(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreatePointBody>,
) -> Result<impl IntoResponse, ApiError> {
    body.validate()?;
    let point = state
        .engine
        .create_point_type(NewPointType {
            point_id: body.point_id,
            name: body.name,
            creator: body.creator,
            image_url: body.image_url,
            guild_id: body.guild_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(point)))
}

// ---------------------------------------------------------------------------
// GET /points/{id} -- point type detail
// ---------------------------------------------------------------------------

/// Return one point type, or 404.
pub async fn get_point(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let point = state.engine.point_type(&PointTypeId::new(id)).await?;
    Ok(Json(point))
}

// ---------------------------------------------------------------------------
// DELETE /points/{id} -- delete and purge
// ---------------------------------------------------------------------------

/// Delete a point type, purging its leaderboard, balances, and events.
pub async fn delete_point(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.engine.delete_point_type(&PointTypeId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// GET /points/{id}/leaderboard -- ranked page
// ---------------------------------------------------------------------------

/// Read one page of a point type's leaderboard.
pub async fn get_point_leaderboard(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<LeaderboardParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (limit, offset) = pagination::clamp(params.limit, params.offset, DEFAULT_POINTS_LIMIT);
    let page = state
        .engine
        .leaderboard(
            &PointTypeId::new(id),
            LeaderboardQuery {
                limit,
                offset,
                order: params.order.unwrap_or_default(),
            },
        )
        .await;

    Ok(Json(serde_json::json!({
        "total": page.total,
        "leaderboard": page.items,
        "offset": page.offset,
        "limit": page.limit,
    })))
}

// ---------------------------------------------------------------------------
// GET /points/{id}/events -- events scoped to a point type
// ---------------------------------------------------------------------------

/// List a point type's events; other filters still apply.
pub async fn get_point_events(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(mut params): Query<EventsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    params.point_id = Some(PointTypeId::new(id));
    let (filter, limit, offset) = params.into_parts();
    let page = state.engine.events(&filter, limit, offset).await;
    Ok(events_response(&page))
}
