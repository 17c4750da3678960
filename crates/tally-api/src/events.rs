//! Event endpoints: filtered listing, single and batch creation,
//! amendment, and deletion.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tally_engine::ApplyRequest;
use tally_types::{Event, EventFilter, EventId, EventKind, Page, PointTypeId, UserId};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::pagination;
use crate::state::AppState;

/// Default page size for event listings.
pub(crate) const DEFAULT_EVENTS_LIMIT: usize = 50;

// ---------------------------------------------------------------------------
// Query and body types
// ---------------------------------------------------------------------------

/// Query parameters for event listings.
///
/// All filters are optional and intersected with AND semantics. The scoped
/// routes (`/points/{id}/events`, `/users/{id}/events`) reuse this struct
/// and overwrite the corresponding filter from the path.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsQuery {
    /// Only events for this user.
    pub user_id: Option<UserId>,
    /// Only events for this point type.
    pub point_id: Option<PointTypeId>,
    /// Only events of this kind.
    #[serde(rename = "type")]
    pub kind: Option<EventKind>,
    /// Only events at or after this instant (RFC 3339).
    pub start_date: Option<DateTime<Utc>>,
    /// Only events at or before this instant (RFC 3339).
    pub end_date: Option<DateTime<Utc>>,
    /// Maximum events to return.
    pub limit: Option<usize>,
    /// Events to skip.
    pub offset: Option<usize>,
}

impl EventsQuery {
    /// Split into an engine filter plus resolved pagination.
    pub(crate) fn into_parts(self) -> (EventFilter, usize, usize) {
        let (limit, offset) = pagination::clamp(self.limit, self.offset, DEFAULT_EVENTS_LIMIT);
        (
            EventFilter {
                user_id: self.user_id,
                point_id: self.point_id,
                kind: self.kind,
                start: self.start_date,
                end: self.end_date,
            },
            limit,
            offset,
        )
    }
}

/// Body of a single event creation.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventBody {
    /// The user whose balance to adjust.
    pub user_id: UserId,
    /// The point type to adjust in.
    pub point_id: PointTypeId,
    /// Direction of the adjustment.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Requested magnitude; must be at least 1.
    #[validate(range(min = 1))]
    pub amount: u64,
}

impl CreateEventBody {
    fn into_request(self) -> ApplyRequest {
        ApplyRequest {
            user_id: self.user_id,
            point_id: self.point_id,
            amount: self.amount,
            kind: self.kind,
        }
    }
}

/// `POST /events` accepts a single event object or an array of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CreateEventPayload {
    /// One adjustment.
    Single(CreateEventBody),
    /// A batch, applied in order.
    Batch(Vec<CreateEventBody>),
}

/// Body of an event amendment. Omitted fields keep their current values.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateEventBody {
    /// Replacement magnitude; must be at least 1 when present.
    #[validate(range(min = 1))]
    pub amount: Option<u64>,
    /// Replacement direction.
    #[serde(rename = "type")]
    pub kind: Option<EventKind>,
}

// ---------------------------------------------------------------------------
// GET /events -- filtered event listing
// ---------------------------------------------------------------------------

/// List events newest-first with optional AND-intersected filters.
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (filter, limit, offset) = params.into_parts();
    let page = state.engine.events(&filter, limit, offset).await;
    Ok(events_response(&page))
}

// ---------------------------------------------------------------------------
// POST /events -- single or batch creation
// ---------------------------------------------------------------------------

/// Create one event, or a batch applied in order.
///
/// The whole payload is validated before anything mutates, matching the
/// single-event rules. A batch that fails partway returns the applied
/// prefix alongside the failure, so callers always learn exactly what was
/// durably applied.
pub async fn create_events(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateEventPayload>,
) -> Result<Response, ApiError> {
    match payload {
        CreateEventPayload::Single(body) => {
            body.validate()?;
            let event = state.engine.apply_event(body.into_request()).await?;
            Ok((StatusCode::CREATED, Json(event)).into_response())
        }
        CreateEventPayload::Batch(bodies) => {
            for body in &bodies {
                body.validate()?;
            }
            let requests: Vec<ApplyRequest> = bodies
                .into_iter()
                .map(CreateEventBody::into_request)
                .collect();

            let outcome = state.engine.apply_batch(&requests).await;
            match outcome.failure {
                None => Ok((StatusCode::CREATED, Json(outcome.applied)).into_response()),
                Some(failure) => {
                    let message = failure.error.to_string();
                    let status = ApiError::from(failure.error).into_response().status();
                    let body = serde_json::json!({
                        "applied": outcome.applied,
                        "failed": {
                            "index": failure.index,
                            "error": message,
                            "unattempted": failure.unattempted,
                        },
                        "status": status.as_u16(),
                    });
                    Ok((status, Json(body)).into_response())
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// PUT /events/{id} -- amend
// ---------------------------------------------------------------------------

/// Amend an event's amount and/or kind, compensating the balance.
pub async fn update_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateEventBody>,
) -> Result<impl IntoResponse, ApiError> {
    body.validate()?;
    let event_id = parse_event_id(&id)?;
    let event = state
        .engine
        .amend_event(event_id, body.amount, body.kind)
        .await?;
    Ok(Json(event))
}

// ---------------------------------------------------------------------------
// DELETE /events/{id}
// ---------------------------------------------------------------------------

/// Delete an event, compensating the balance, and return 204.
pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let event_id = parse_event_id(&id)?;
    state.engine.delete_event(event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Shape an event page into the wire envelope shared by every event listing.
pub(crate) fn events_response(page: &Page<Event>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "total": page.total,
        "events": page.items,
        "offset": page.offset,
        "limit": page.limit,
    }))
}

/// Parse an event id from a path segment.
fn parse_event_id(raw: &str) -> Result<EventId, ApiError> {
    raw.parse::<Uuid>()
        .map(EventId::from)
        .map_err(|e| ApiError::InvalidQuery(format!("invalid event id {raw}: {e}")))
}
