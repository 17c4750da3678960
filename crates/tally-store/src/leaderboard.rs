//! The leaderboard index: one ranked structure per point type.
//!
//! Kept numerically identical to the balance table at all times -- the
//! engine applies every balance delta to both inside the same write guard.
//! Each board mirrors its score map with an ordered `(score, user)` set,
//! the in-process equivalent of a Redis sorted set: rank-range reads in
//! either direction without scanning, and deterministic tie order.
//!
//! A user leaves the board when their score returns to exactly zero; a
//! negative score (possible only through amendment) stays ranked.

use std::collections::{BTreeMap, BTreeSet};

use tally_types::{LeaderboardEntry, LeaderboardQuery, Page, PointTypeId, SortOrder, UserId};

/// One point type's ranking.
#[derive(Debug, Default)]
struct Board {
    /// Current score per user.
    scores: BTreeMap<UserId, i64>,
    /// Scores mirrored as an ordered set for rank-range reads.
    /// Ties order by user id, so repeated reads are stable.
    ranked: BTreeSet<(i64, UserId)>,
}

/// Ranked score structures for every point type.
#[derive(Debug, Default)]
pub struct LeaderboardIndex {
    boards: BTreeMap<PointTypeId, Board>,
}

impl LeaderboardIndex {
    /// Create an empty index.
    pub const fn new() -> Self {
        Self {
            boards: BTreeMap::new(),
        }
    }

    /// Set a user's score on a point type's board.
    ///
    /// A score of exactly zero removes the user from the board.
    pub fn set_score(&mut self, point_id: &PointTypeId, user_id: &UserId, score: i64) {
        let board = self.boards.entry(point_id.clone()).or_default();

        if let Some(previous) = board.scores.remove(user_id) {
            board.ranked.remove(&(previous, user_id.clone()));
        }

        if score != 0 {
            board.scores.insert(user_id.clone(), score);
            board.ranked.insert((score, user_id.clone()));
        }

        if board.scores.is_empty() {
            self.boards.remove(point_id);
        }
    }

    /// A user's current ranked score, if they are on the board.
    pub fn score(&self, point_id: &PointTypeId, user_id: &UserId) -> Option<i64> {
        self.boards
            .get(point_id)
            .and_then(|board| board.scores.get(user_id).copied())
    }

    /// Number of ranked users on a point type's board.
    pub fn ranked_len(&self, point_id: &PointTypeId) -> usize {
        self.boards.get(point_id).map_or(0, |board| board.scores.len())
    }

    /// Read one page of the ranking.
    ///
    /// `Desc` returns highest scores first. Within equal scores the tie
    /// order is by user id, ascending for `Asc` reads and descending for
    /// `Desc` reads -- stable either way.
    pub fn page(&self, point_id: &PointTypeId, query: LeaderboardQuery) -> Page<LeaderboardEntry> {
        let Some(board) = self.boards.get(point_id) else {
            return Page {
                total: 0,
                items: Vec::new(),
                offset: query.offset,
                limit: query.limit,
            };
        };

        let to_entry = |(points, user_id): &(i64, UserId)| LeaderboardEntry {
            user_id: user_id.clone(),
            points: *points,
        };

        let items: Vec<LeaderboardEntry> = match query.order {
            SortOrder::Asc => board
                .ranked
                .iter()
                .skip(query.offset)
                .take(query.limit)
                .map(to_entry)
                .collect(),
            SortOrder::Desc => board
                .ranked
                .iter()
                .rev()
                .skip(query.offset)
                .take(query.limit)
                .map(to_entry)
                .collect(),
        };

        Page {
            total: u64::try_from(board.scores.len()).unwrap_or(u64::MAX),
            items,
            offset: query.offset,
            limit: query.limit,
        }
    }

    /// Drop a point type's entire board.
    pub fn remove_board(&mut self, point_id: &PointTypeId) {
        self.boards.remove(point_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(limit: usize, offset: usize, order: SortOrder) -> LeaderboardQuery {
        LeaderboardQuery {
            limit,
            offset,
            order,
        }
    }

    #[test]
    fn empty_board_returns_empty_page() {
        let index = LeaderboardIndex::new();
        let page = index.page(&PointTypeId::new("gold"), query(10, 0, SortOrder::Desc));
        assert_eq!(page.total, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn desc_ranks_highest_first() {
        let mut index = LeaderboardIndex::new();
        let gold = PointTypeId::new("gold");
        index.set_score(&gold, &UserId::new("a"), 10);
        index.set_score(&gold, &UserId::new("b"), 30);
        index.set_score(&gold, &UserId::new("c"), 20);

        let page = index.page(&gold, query(10, 0, SortOrder::Desc));
        let scores: Vec<i64> = page.items.iter().map(|e| e.points).collect();
        assert_eq!(scores, vec![30, 20, 10]);
        assert_eq!(page.total, 3);
    }

    #[test]
    fn asc_ranks_lowest_first() {
        let mut index = LeaderboardIndex::new();
        let gold = PointTypeId::new("gold");
        index.set_score(&gold, &UserId::new("a"), 10);
        index.set_score(&gold, &UserId::new("b"), 30);

        let page = index.page(&gold, query(10, 0, SortOrder::Asc));
        let scores: Vec<i64> = page.items.iter().map(|e| e.points).collect();
        assert_eq!(scores, vec![10, 30]);
    }

    #[test]
    fn pagination_slices_the_ranking() {
        let mut index = LeaderboardIndex::new();
        let gold = PointTypeId::new("gold");
        for (user, score) in [("a", 1), ("b", 2), ("c", 3), ("d", 4)] {
            index.set_score(&gold, &UserId::new(user), score);
        }

        let page = index.page(&gold, query(2, 1, SortOrder::Desc));
        let scores: Vec<i64> = page.items.iter().map(|e| e.points).collect();
        assert_eq!(scores, vec![3, 2]);
        assert_eq!(page.total, 4);
        assert_eq!(page.offset, 1);
        assert_eq!(page.limit, 2);
    }

    #[test]
    fn ties_are_stable_across_reads() {
        let mut index = LeaderboardIndex::new();
        let gold = PointTypeId::new("gold");
        index.set_score(&gold, &UserId::new("b"), 10);
        index.set_score(&gold, &UserId::new("a"), 10);

        let first = index.page(&gold, query(10, 0, SortOrder::Desc));
        let second = index.page(&gold, query(10, 0, SortOrder::Desc));
        assert_eq!(first, second);
    }

    #[test]
    fn zero_score_leaves_the_board() {
        let mut index = LeaderboardIndex::new();
        let gold = PointTypeId::new("gold");
        let user = UserId::new("a");

        index.set_score(&gold, &user, 10);
        index.set_score(&gold, &user, 0);

        assert_eq!(index.score(&gold, &user), None);
        assert_eq!(index.ranked_len(&gold), 0);
    }

    #[test]
    fn negative_score_stays_ranked() {
        let mut index = LeaderboardIndex::new();
        let gold = PointTypeId::new("gold");
        index.set_score(&gold, &UserId::new("a"), -5);
        index.set_score(&gold, &UserId::new("b"), 3);

        let page = index.page(&gold, query(10, 0, SortOrder::Desc));
        let scores: Vec<i64> = page.items.iter().map(|e| e.points).collect();
        assert_eq!(scores, vec![3, -5]);
    }

    #[test]
    fn updating_a_score_replaces_the_old_rank() {
        let mut index = LeaderboardIndex::new();
        let gold = PointTypeId::new("gold");
        let user = UserId::new("a");

        index.set_score(&gold, &user, 10);
        index.set_score(&gold, &user, 25);

        assert_eq!(index.score(&gold, &user), Some(25));
        assert_eq!(index.ranked_len(&gold), 1);
    }
}
