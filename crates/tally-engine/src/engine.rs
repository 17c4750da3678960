//! The ledger engine: sole mutator of every derived view.
//!
//! All store state lives behind one [`tokio::sync::RwLock`]. A mutation
//! takes the write guard, updates the balance table, leaderboard index,
//! event log, and counters together, and only then releases the guard --
//! so the "leaderboard score == balance" invariant holds at every point a
//! reader can observe, and the clamping read-then-write on a balance is a
//! single atomic unit per (user, point type) pair. Readers share the read
//! guard and never see a half-applied mutation.
//!
//! Feed publication happens after the guard is released: the mutation is
//! durable first, and a slow or absent subscriber can never fail it.
//!
//! # Invariants
//!
//! 1. Balance(user, type) equals the sum of signed amounts of the
//!    currently-existing events for the pair.
//! 2. The leaderboard mirrors every non-zero balance exactly.
//! 3. `apply_event` never drives a balance below zero (removals clamp);
//!    amendment is exempt by design -- it is an authoritative correction.
//! 4. Global counters and per-type `user_count` only ever grow.

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use tally_store::{
    BalanceTable, EventLog, LeaderboardIndex, PointTypeRegistry, StatsCounters, UserRegistry,
};
use tally_types::{
    Event, EventFilter, EventId, EventKind, FeedMessage, LeaderboardEntry, LeaderboardQuery, Page,
    PointType, PointTypeId, Stats, User, UserId, UserWithBalances,
};

use crate::error::EngineError;
use crate::hub::BroadcastHub;

// ---------------------------------------------------------------------------
// Request and outcome types
// ---------------------------------------------------------------------------

/// One requested balance adjustment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyRequest {
    /// The user whose balance to adjust. Need not pre-exist.
    pub user_id: UserId,
    /// The point type to adjust in. Need not pre-exist.
    pub point_id: PointTypeId,
    /// Requested magnitude; must be a positive integer. Removals may record
    /// less than this after clamping.
    pub amount: u64,
    /// Direction of the adjustment.
    pub kind: EventKind,
}

/// Parameters for registering a point type.
///
/// Packs the creation fields into one struct to keep call sites readable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPointType {
    /// Externally-assigned identifier; must be unused.
    pub point_id: PointTypeId,
    /// Display name; must be non-empty.
    pub name: String,
    /// Reference to whoever created the point type.
    pub creator: String,
    /// Optional image reference.
    pub image_url: Option<String>,
    /// Optional community (guild) reference.
    pub guild_id: Option<String>,
}

/// Result of a batch application.
///
/// A batch is not atomic as a whole: tuples apply strictly in order and the
/// first failure stops the batch, so `applied` is always an exact prefix of
/// the request list -- what was durably applied, nothing more or less.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Events created for the applied prefix, in request order.
    pub applied: Vec<Event>,
    /// The failure that stopped the batch, when one occurred.
    pub failure: Option<BatchFailure>,
}

/// Where and why a batch stopped.
#[derive(Debug)]
pub struct BatchFailure {
    /// Zero-based index of the tuple that failed.
    pub index: usize,
    /// Why it failed.
    pub error: EngineError,
    /// Tuples after the failing one that were never attempted.
    pub unattempted: usize,
}

// ---------------------------------------------------------------------------
// Engine state
// ---------------------------------------------------------------------------

/// Every derived structure the engine keeps consistent, guarded as a unit.
#[derive(Debug, Default)]
struct LedgerState {
    balances: BalanceTable,
    leaderboards: LeaderboardIndex,
    events: EventLog,
    counters: StatsCounters,
    points: PointTypeRegistry,
    users: UserRegistry,
}

/// The ledger engine.
///
/// The only component permitted to mutate the stores. Cheap to share via
/// [`std::sync::Arc`]; all methods take `&self`.
#[derive(Debug)]
pub struct LedgerEngine {
    state: RwLock<LedgerState>,
    hub: BroadcastHub,
}

impl LedgerEngine {
    /// Create an engine with empty stores and a default-capacity hub.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(LedgerState::default()),
            hub: BroadcastHub::new(),
        }
    }

    /// The engine's broadcast hub.
    pub const fn hub(&self) -> &BroadcastHub {
        &self.hub
    }

    /// Subscribe to feed messages published from this moment on.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<FeedMessage> {
        self.hub.subscribe()
    }

    // -----------------------------------------------------------------------
    // Event application
    // -----------------------------------------------------------------------

    /// Apply one adjustment event.
    ///
    /// Removals clamp to the available balance: the recorded event amount is
    /// what was actually debited, and "insufficient balance" is not an
    /// error. The new event and refreshed stats are published to the feed
    /// after the write commits.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] when the amount is not a
    /// positive integer within range.
    pub async fn apply_event(&self, request: ApplyRequest) -> Result<Event, EngineError> {
        let (event, stats) = {
            let mut state = self.state.write().await;
            let event = Self::apply_one(&mut state, &request)?;
            (event, state.counters.snapshot())
        };

        debug!(
            event_id = %event.id,
            user_id = %event.user_id,
            point_id = %event.point_id,
            amount = event.amount,
            "event applied"
        );
        self.publish_mutation(&event, stats);
        Ok(event)
    }

    /// Apply a list of adjustments sequentially within one write guard.
    ///
    /// Later tuples observe the balance effects of earlier ones, so
    /// clamping composes the way a caller reading the batch top-to-bottom
    /// expects. The first failing tuple stops the batch; the outcome
    /// reports the applied prefix and the failure.
    pub async fn apply_batch(&self, requests: &[ApplyRequest]) -> BatchOutcome {
        let total = requests.len();
        let mut results: Vec<(Event, Stats)> = Vec::with_capacity(total);
        let mut failure = None;

        {
            let mut state = self.state.write().await;
            for (index, request) in requests.iter().enumerate() {
                match Self::apply_one(&mut state, request) {
                    Ok(event) => results.push((event, state.counters.snapshot())),
                    Err(error) => {
                        failure = Some(BatchFailure {
                            index,
                            error,
                            unattempted: total.saturating_sub(index).saturating_sub(1),
                        });
                        break;
                    }
                }
            }
        }

        for (event, stats) in &results {
            self.publish_mutation(event, *stats);
        }

        if let Some(ref batch_failure) = failure {
            debug!(
                applied = results.len(),
                failed_index = batch_failure.index,
                "batch stopped early"
            );
        }

        BatchOutcome {
            applied: results.into_iter().map(|(event, _)| event).collect(),
            failure,
        }
    }

    /// Amend an event's amount and/or kind.
    ///
    /// The balance and leaderboard receive the difference between the new
    /// and old signed amounts. The clamp policy is deliberately not
    /// re-applied: an amendment is an authoritative correction, so it may
    /// leave the pair's balance negative. The timestamp is refreshed.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotFound`] for an unknown event id;
    /// [`EngineError::InvalidInput`] for a non-positive replacement amount.
    pub async fn amend_event(
        &self,
        event_id: EventId,
        new_amount: Option<u64>,
        new_kind: Option<EventKind>,
    ) -> Result<Event, EngineError> {
        if new_amount == Some(0) {
            return Err(EngineError::invalid("amount must be a positive integer"));
        }
        if let Some(amount) = new_amount
            && i64::try_from(amount).is_err()
        {
            return Err(EngineError::invalid("amount exceeds the supported range"));
        }

        let (amended, stats) = {
            let mut state = self.state.write().await;
            let original = state
                .events
                .get(event_id)
                .cloned()
                .ok_or_else(|| EngineError::not_found(format!("event {event_id}")))?;

            let amount = new_amount.unwrap_or(original.amount);
            let kind = new_kind.unwrap_or(original.kind);

            let delta = kind.signed(amount).saturating_sub(original.signed_amount());
            let amended = Event {
                id: original.id,
                user_id: original.user_id,
                point_id: original.point_id,
                kind,
                amount,
                timestamp: Utc::now(),
            };

            let balance =
                state
                    .balances
                    .apply_delta(&amended.user_id, &amended.point_id, delta);
            state
                .leaderboards
                .set_score(&amended.point_id, &amended.user_id, balance);
            state.events.replace(amended.clone());

            (amended, state.counters.snapshot())
        };

        debug!(event_id = %amended.id, amount = amended.amount, "event amended");
        self.publish_mutation(&amended, stats);
        Ok(amended)
    }

    /// Delete an event, compensating the balance and leaderboard by the
    /// negation of its signed amount.
    ///
    /// Aggregate counters and `user_count` are never rolled back. Returns
    /// the removed record.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotFound`] for an unknown event id.
    pub async fn delete_event(&self, event_id: EventId) -> Result<Event, EngineError> {
        let (removed, stats) = {
            let mut state = self.state.write().await;
            let removed = state
                .events
                .remove(event_id)
                .ok_or_else(|| EngineError::not_found(format!("event {event_id}")))?;

            let delta = removed.signed_amount().saturating_neg();
            let balance =
                state
                    .balances
                    .apply_delta(&removed.user_id, &removed.point_id, delta);
            state
                .leaderboards
                .set_score(&removed.point_id, &removed.user_id, balance);

            (removed, state.counters.snapshot())
        };

        debug!(event_id = %removed.id, "event deleted");
        self.publish_mutation(&removed, stats);
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // Point types
    // -----------------------------------------------------------------------

    /// Register a point type.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidInput`] when the name is empty or the id is
    /// already taken.
    pub async fn create_point_type(&self, new: NewPointType) -> Result<PointType, EngineError> {
        if new.name.trim().is_empty() {
            return Err(EngineError::invalid("name must not be empty"));
        }

        let point = PointType {
            point_id: new.point_id,
            name: new.name,
            creator: new.creator,
            image_url: new.image_url,
            guild_id: new.guild_id,
            created_at: Utc::now(),
            user_count: 0,
        };

        let mut state = self.state.write().await;
        if !state.points.insert(point.clone()) {
            return Err(EngineError::invalid(format!(
                "point type {} already exists",
                point.point_id
            )));
        }
        state.counters.record_point_type();

        info!(point_id = %point.point_id, name = %point.name, "point type created");
        Ok(point)
    }

    /// Look up a point type by id.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotFound`] when the id is unknown.
    pub async fn point_type(&self, point_id: &PointTypeId) -> Result<PointType, EngineError> {
        self.state
            .read()
            .await
            .points
            .get(point_id)
            .cloned()
            .ok_or_else(|| EngineError::not_found(format!("point type {point_id}")))
    }

    /// List point types in creation order, optionally filtered by a
    /// case-insensitive name substring.
    pub async fn list_point_types(
        &self,
        limit: usize,
        offset: usize,
        name: Option<&str>,
    ) -> Page<PointType> {
        self.state.read().await.points.page(limit, offset, name)
    }

    /// Delete a point type, purging its leaderboard, balances, and events.
    ///
    /// Global counters are not decremented. Returns the removed record.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotFound`] when the id is unknown.
    pub async fn delete_point_type(
        &self,
        point_id: &PointTypeId,
    ) -> Result<PointType, EngineError> {
        let mut state = self.state.write().await;
        let removed = state
            .points
            .remove(point_id)
            .ok_or_else(|| EngineError::not_found(format!("point type {point_id}")))?;

        let balances_purged = state.balances.purge_point_type(point_id);
        state.leaderboards.remove_board(point_id);
        let events_purged = state.events.purge_point_type(point_id);

        info!(
            point_id = %point_id,
            balances_purged,
            events_purged,
            "point type deleted"
        );
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    /// Register a user with an explicit display name.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidInput`] when the name is empty or the id is
    /// already taken.
    pub async fn create_user(&self, user_id: UserId, name: String) -> Result<User, EngineError> {
        if name.trim().is_empty() {
            return Err(EngineError::invalid("name must not be empty"));
        }

        let user = User {
            user_id,
            name,
            created_at: Utc::now(),
        };

        let mut state = self.state.write().await;
        if !state.users.insert(user.clone()) {
            return Err(EngineError::invalid(format!(
                "user {} already exists",
                user.user_id
            )));
        }
        state.counters.record_user();

        info!(user_id = %user.user_id, "user created");
        Ok(user)
    }

    /// Look up a user with their current balances.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotFound`] when the user has never been seen.
    pub async fn user(&self, user_id: &UserId) -> Result<UserWithBalances, EngineError> {
        let state = self.state.read().await;
        let user = state
            .users
            .get(user_id)
            .ok_or_else(|| EngineError::not_found(format!("user {user_id}")))?;

        Ok(UserWithBalances {
            user_id: user.user_id.clone(),
            name: user.name.clone(),
            created_at: user.created_at,
            points: state.balances.balances_for_user(user_id),
        })
    }

    /// List users in creation order, each joined with their balances.
    pub async fn list_users(&self, limit: usize, offset: usize) -> Page<UserWithBalances> {
        let state = self.state.read().await;
        let page = state.users.page(limit, offset);

        Page {
            total: page.total,
            items: page
                .items
                .into_iter()
                .map(|user| {
                    let points = state.balances.balances_for_user(&user.user_id);
                    UserWithBalances {
                        user_id: user.user_id,
                        name: user.name,
                        created_at: user.created_at,
                        points,
                    }
                })
                .collect(),
            offset: page.offset,
            limit: page.limit,
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Read one page of a point type's leaderboard.
    ///
    /// A point type with no ranked users (including one never created)
    /// yields an empty page, mirroring how a ranked store treats an absent
    /// key.
    pub async fn leaderboard(
        &self,
        point_id: &PointTypeId,
        query: LeaderboardQuery,
    ) -> Page<LeaderboardEntry> {
        self.state.read().await.leaderboards.page(point_id, query)
    }

    /// Query the event log, newest first, with AND-intersected filters.
    pub async fn events(&self, filter: &EventFilter, limit: usize, offset: usize) -> Page<Event> {
        self.state.read().await.events.query(filter, limit, offset)
    }

    /// Current global totals.
    pub async fn stats(&self) -> Stats {
        self.state.read().await.counters.snapshot()
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Apply one adjustment against the guarded state.
    ///
    /// The caller holds the write guard, which is what makes the
    /// read-clamp-write span atomic per (user, point type) pair.
    fn apply_one(state: &mut LedgerState, request: &ApplyRequest) -> Result<Event, EngineError> {
        if request.amount == 0 {
            return Err(EngineError::invalid("amount must be a positive integer"));
        }
        let Ok(magnitude) = i64::try_from(request.amount) else {
            return Err(EngineError::invalid("amount exceeds the supported range"));
        };

        let current = state.balances.get(&request.user_id, &request.point_id);
        // Removals clamp to what is actually available; a negative balance
        // (reachable only via amendment) has nothing available to remove.
        let (recorded, delta) = match request.kind {
            EventKind::Add => (request.amount, magnitude),
            EventKind::Remove => {
                let clamped = current.max(0).min(magnitude);
                (clamped.unsigned_abs(), clamped.saturating_neg())
            }
        };

        let timestamp = Utc::now();
        let event = Event {
            id: EventId::new(),
            user_id: request.user_id.clone(),
            point_id: request.point_id.clone(),
            kind: request.kind,
            amount: recorded,
            timestamp,
        };

        let balance = state
            .balances
            .apply_delta(&request.user_id, &request.point_id, delta);
        state
            .leaderboards
            .set_score(&request.point_id, &request.user_id, balance);
        state.events.append(event.clone());
        state.counters.record_event();

        if request.kind == EventKind::Add
            && state
                .balances
                .credit_first_add(&request.user_id, &request.point_id)
        {
            state.points.increment_user_count(&request.point_id);
        }
        if state.users.ensure(&request.user_id, timestamp) {
            state.counters.record_user();
        }

        Ok(event)
    }

    /// Push the event/stats pair for one accepted mutation to the feed.
    fn publish_mutation(&self, event: &Event, stats: Stats) {
        self.hub.publish(FeedMessage::Event(event.clone()));
        self.hub.publish(FeedMessage::Stats(stats));
    }
}

impl Default for LedgerEngine {
    fn default() -> Self {
        Self::new()
    }
}
