//! The point-type registry: records, creation order, and name filtering.
//!
//! Listing walks an insertion-ordered index maintained alongside creation,
//! so a page read costs the page, not the whole keyspace. The name filter
//! is a case-insensitive substring match applied during the walk.

use tally_types::{Page, PointType, PointTypeId};

/// All known point types.
#[derive(Debug, Default)]
pub struct PointTypeRegistry {
    records: std::collections::BTreeMap<PointTypeId, PointType>,
    /// Ids in creation order; drives stable paginated listing.
    creation_order: Vec<PointTypeId>,
}

impl PointTypeRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            records: std::collections::BTreeMap::new(),
            creation_order: Vec::new(),
        }
    }

    /// Register a new point type.
    ///
    /// Returns `false` (and leaves the registry unchanged) when the id is
    /// already taken.
    pub fn insert(&mut self, point: PointType) -> bool {
        if self.records.contains_key(&point.point_id) {
            return false;
        }
        self.creation_order.push(point.point_id.clone());
        self.records.insert(point.point_id.clone(), point);
        true
    }

    /// Look up a point type by id.
    pub fn get(&self, point_id: &PointTypeId) -> Option<&PointType> {
        self.records.get(point_id)
    }

    /// Whether a point type exists.
    pub fn contains(&self, point_id: &PointTypeId) -> bool {
        self.records.contains_key(point_id)
    }

    /// Bump a point type's denormalized distinct-user count.
    pub fn increment_user_count(&mut self, point_id: &PointTypeId) {
        if let Some(point) = self.records.get_mut(point_id) {
            point.user_count = point.user_count.saturating_add(1);
        }
    }

    /// Remove a point type. Returns the removed record.
    pub fn remove(&mut self, point_id: &PointTypeId) -> Option<PointType> {
        let removed = self.records.remove(point_id)?;
        self.creation_order.retain(|id| id != point_id);
        Some(removed)
    }

    /// Read one page of point types in creation order, optionally filtered
    /// by a case-insensitive name substring.
    pub fn page(&self, limit: usize, offset: usize, name: Option<&str>) -> Page<PointType> {
        let needle = name.map(str::to_lowercase);
        let matches: Vec<&PointType> = self
            .creation_order
            .iter()
            .filter_map(|id| self.records.get(id))
            .filter(|point| {
                needle
                    .as_deref()
                    .is_none_or(|needle| point.name.to_lowercase().contains(needle))
            })
            .collect();

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

    /// Number of registered point types.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no point types are registered.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn point(id: &str, name: &str) -> PointType {
        PointType {
            point_id: PointTypeId::new(id),
            name: name.to_owned(),
            creator: String::from("admin"),
            image_url: None,
            guild_id: None,
            created_at: Utc::now(),
            user_count: 0,
        }
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut registry = PointTypeRegistry::new();
        assert!(registry.insert(point("gold", "Gold")));
        assert!(!registry.insert(point("gold", "Other Gold")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn listing_follows_creation_order() {
        let mut registry = PointTypeRegistry::new();
        registry.insert(point("zeta", "Zeta"));
        registry.insert(point("alpha", "Alpha"));

        let page = registry.page(10, 0, None);
        let ids: Vec<&str> = page.items.iter().map(|p| p.point_id.as_str()).collect();
        assert_eq!(ids, vec!["zeta", "alpha"]);
    }

    #[test]
    fn name_filter_is_case_insensitive_substring() {
        let mut registry = PointTypeRegistry::new();
        registry.insert(point("gold", "Guild Gold"));
        registry.insert(point("karma", "Karma"));

        let page = registry.page(10, 0, Some("GOLD"));
        assert_eq!(page.total, 1);
        assert_eq!(
            page.items.first().map(|p| p.point_id.as_str()),
            Some("gold")
        );
    }

    #[test]
    fn user_count_increments() {
        let mut registry = PointTypeRegistry::new();
        registry.insert(point("gold", "Gold"));
        registry.increment_user_count(&PointTypeId::new("gold"));
        registry.increment_user_count(&PointTypeId::new("gold"));

        assert_eq!(registry.get(&PointTypeId::new("gold")).map(|p| p.user_count), Some(2));
    }

    #[test]
    fn remove_drops_record_and_order_entry() {
        let mut registry = PointTypeRegistry::new();
        registry.insert(point("gold", "Gold"));
        registry.insert(point("karma", "Karma"));

        assert!(registry.remove(&PointTypeId::new("gold")).is_some());
        assert!(registry.remove(&PointTypeId::new("gold")).is_none());

        let page = registry.page(10, 0, None);
        let ids: Vec<&str> = page.items.iter().map(|p| p.point_id.as_str()).collect();
        assert_eq!(ids, vec!["karma"]);
    }
}
