//! The event log: every currently-valid ledger event, with secondary
//! indexes for the filters the query API supports.
//!
//! Append-only in the normal path; amendment rewrites a record in place and
//! deletion removes one, always through the engine so the compensating
//! balance adjustment happens in the same write guard.
//!
//! Per-user and per-point-type id sets are maintained incrementally so a
//! filtered query only walks the events that can match, instead of scanning
//! the whole log. Filters are intersected with AND semantics.

use std::collections::{BTreeMap, BTreeSet};

use tally_types::{Event, EventFilter, EventId, Page, PointTypeId, UserId};

/// All currently-valid events plus their secondary indexes.
#[derive(Debug, Default)]
pub struct EventLog {
    /// Event records by id.
    events: BTreeMap<EventId, Event>,
    /// Ids of every event belonging to a user.
    by_user: BTreeMap<UserId, BTreeSet<EventId>>,
    /// Ids of every event belonging to a point type.
    by_point: BTreeMap<PointTypeId, BTreeSet<EventId>>,
}

impl EventLog {
    /// Create an empty log.
    pub const fn new() -> Self {
        Self {
            events: BTreeMap::new(),
            by_user: BTreeMap::new(),
            by_point: BTreeMap::new(),
        }
    }

    /// Append a newly-accepted event and index it.
    pub fn append(&mut self, event: Event) {
        self.by_user
            .entry(event.user_id.clone())
            .or_default()
            .insert(event.id);
        self.by_point
            .entry(event.point_id.clone())
            .or_default()
            .insert(event.id);
        self.events.insert(event.id, event);
    }

    /// Look up an event by id.
    pub fn get(&self, id: EventId) -> Option<&Event> {
        self.events.get(&id)
    }

    /// Overwrite an amended event record.
    ///
    /// Amendment never changes the user or point type, so the secondary
    /// indexes stay valid.
    pub fn replace(&mut self, event: Event) {
        self.events.insert(event.id, event);
    }

    /// Remove an event and unindex it. Returns the removed record.
    pub fn remove(&mut self, id: EventId) -> Option<Event> {
        let event = self.events.remove(&id)?;

        if let Some(ids) = self.by_user.get_mut(&event.user_id) {
            ids.remove(&id);
            if ids.is_empty() {
                self.by_user.remove(&event.user_id);
            }
        }
        if let Some(ids) = self.by_point.get_mut(&event.point_id) {
            ids.remove(&id);
            if ids.is_empty() {
                self.by_point.remove(&event.point_id);
            }
        }

        Some(event)
    }

    /// Remove every event belonging to a point type.
    ///
    /// Returns the number of events purged.
    pub fn purge_point_type(&mut self, point_id: &PointTypeId) -> usize {
        let Some(ids) = self.by_point.remove(point_id) else {
            return 0;
        };

        let mut purged = 0_usize;
        for id in ids {
            if let Some(event) = self.events.remove(&id) {
                purged = purged.saturating_add(1);
                if let Some(user_ids) = self.by_user.get_mut(&event.user_id) {
                    user_ids.remove(&id);
                    if user_ids.is_empty() {
                        self.by_user.remove(&event.user_id);
                    }
                }
            }
        }
        purged
    }

    /// Query the log, newest first.
    ///
    /// All supplied filters must match (AND). `total` counts every match
    /// before pagination. Ties on the timestamp are broken by event id,
    /// descending, so identical queries read identical pages.
    pub fn query(&self, filter: &EventFilter, limit: usize, offset: usize) -> Page<Event> {
        let mut matches: Vec<&Event> = match (&filter.user_id, &filter.point_id) {
            // Both id filters: walk the smaller index set, intersect the other.
            (Some(user_id), Some(point_id)) => {
                let user_ids = self.by_user.get(user_id);
                let point_ids = self.by_point.get(point_id);
                match (user_ids, point_ids) {
                    (Some(user_ids), Some(point_ids)) => user_ids
                        .intersection(point_ids)
                        .filter_map(|id| self.events.get(id))
                        .filter(|event| Self::matches_rest(event, filter))
                        .collect(),
                    _ => Vec::new(),
                }
            }
            (Some(user_id), None) => self.indexed_matches(self.by_user.get(user_id), filter),
            (None, Some(point_id)) => self.indexed_matches(self.by_point.get(point_id), filter),
            (None, None) => self
                .events
                .values()
                .filter(|event| Self::matches_rest(event, filter))
                .collect(),
        };

        matches.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.id.cmp(&a.id))
        });

        Page {
            total: u64::try_from(matches.len()).unwrap_or(u64::MAX),
            items: matches
                .into_iter()
                .skip(offset)
                .take(limit)
                .cloned()
                .collect(),
            offset,
            limit,
        }
    }

    /// Number of currently-valid events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the log holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Resolve one id set against the kind/time filters.
    fn indexed_matches(
        &self,
        ids: Option<&BTreeSet<EventId>>,
        filter: &EventFilter,
    ) -> Vec<&Event> {
        ids.map_or_else(Vec::new, |ids| {
            ids.iter()
                .filter_map(|id| self.events.get(id))
                .filter(|event| Self::matches_rest(event, filter))
                .collect()
        })
    }

    /// The non-indexed filter conditions: kind and time range.
    fn matches_rest(event: &Event, filter: &EventFilter) -> bool {
        if let Some(kind) = filter.kind
            && event.kind != kind
        {
            return false;
        }
        if let Some(start) = filter.start
            && event.timestamp < start
        {
            return false;
        }
        if let Some(end) = filter.end
            && event.timestamp > end
        {
            return false;
        }
        true
    }
}
