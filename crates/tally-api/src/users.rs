//! User endpoints: listing, explicit creation, detail with balances, and
//! the per-user event view.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tally_types::UserId;
use validator::Validate;

use crate::error::ApiError;
use crate::events::{events_response, EventsQuery};
use crate::pagination;
use crate::state::AppState;

/// Default page size for user listings.
const DEFAULT_USERS_LIMIT: usize = 50;

// ---------------------------------------------------------------------------
// Query and body types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /users`.
#[derive(Debug, Deserialize)]
pub struct UsersListQuery {
    /// Maximum users to return.
    pub limit: Option<usize>,
    /// Users to skip.
    pub offset: Option<usize>,
}

/// Body of `POST /users`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserBody {
    /// Externally-assigned identifier.
    pub user_id: UserId,
    /// Display name.
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

// ---------------------------------------------------------------------------
// GET /users -- list users with balances
// ---------------------------------------------------------------------------

/// List users in creation order, each joined with their balances.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UsersListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (limit, offset) = pagination::clamp(params.limit, params.offset, DEFAULT_USERS_LIMIT);
    let page = state.engine.list_users(limit, offset).await;

    Ok(Json(serde_json::json!({
        "total": page.total,
        "users": page.items,
        "offset": page.offset,
        "limit": page.limit,
    })))
}

// ---------------------------------------------------------------------------
// POST /users -- explicit user creation
// ---------------------------------------------------------------------------

/// Register a user with an explicit display name, status 201.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateUserBody>,
) -> Result<impl IntoResponse, ApiError> {
    body.validate()?;
    let user = state.engine.create_user(body.user_id, body.name).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

// ---------------------------------------------------------------------------
// GET /users/{id} -- user detail with balances
// ---------------------------------------------------------------------------

/// Return one user with their current balances, or 404 if never seen.
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.engine.user(&UserId::new(id)).await?;
    Ok(Json(user))
}

// ---------------------------------------------------------------------------
// GET /users/{id}/events -- events scoped to a user
// ---------------------------------------------------------------------------

/// List a user's events; other filters still apply.
pub async fn get_user_events(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(mut params): Query<EventsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    params.user_id = Some(UserId::new(id));
    let (filter, limit, offset) = params.into_parts();
    let page = state.engine.events(&filter, limit, offset).await;
    Ok(events_response(&page))
}
