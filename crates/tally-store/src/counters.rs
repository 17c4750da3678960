//! Global aggregate counters, maintained incrementally.
//!
//! Three monotonic "ever seen" tallies: distinct users, events created,
//! point types created. The engine bumps them at the moment the underlying
//! record is first accepted; deleting an event or purging a point type does
//! not roll them back. Nothing here is recomputed by scanning.

use tally_types::Stats;

/// Incrementally-maintained global totals.
#[derive(Debug, Default)]
pub struct StatsCounters {
    stats: Stats,
}

impl StatsCounters {
    /// Create zeroed counters.
    pub const fn new() -> Self {
        Self {
            stats: Stats {
                users: 0,
                events: 0,
                points: 0,
            },
        }
    }

    /// Count a never-before-seen user.
    pub const fn record_user(&mut self) {
        self.stats.users = self.stats.users.saturating_add(1);
    }

    /// Count a newly-created event.
    pub const fn record_event(&mut self) {
        self.stats.events = self.stats.events.saturating_add(1);
    }

    /// Count a newly-created point type.
    pub const fn record_point_type(&mut self) {
        self.stats.points = self.stats.points.saturating_add(1);
    }

    /// Current totals.
    pub const fn snapshot(&self) -> Stats {
        self.stats
    }
}
