#![forbid(unsafe_code)]

//! Latest intersection state per observed heading.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One intersection-observer entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityRecord {
    pub heading_id: String,
    /// Whether the heading overlaps the observer's root area.
    pub is_intersecting: bool,
    /// Viewport-relative top of the heading when the entry was produced.
    pub top_offset: f64,
}

impl VisibilityRecord {
    #[must_use]
    pub fn new(heading_id: impl Into<String>, is_intersecting: bool, top_offset: f64) -> Self {
        Self {
            heading_id: heading_id.into(),
            is_intersecting,
            top_offset,
        }
    }
}

/// Map from heading id to its most recent record.
#[derive(Debug, Clone, Default)]
pub struct VisibilityMap {
    records: HashMap<String, VisibilityRecord>,
}

impl VisibilityMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a whole observer batch. Later entries for the same id win.
    pub fn apply_batch<'a>(&mut self, batch: impl IntoIterator<Item = &'a VisibilityRecord>) {
        for record in batch {
            self.records
                .insert(record.heading_id.clone(), record.clone());
        }
    }

    #[must_use]
    pub fn get(&self, heading_id: &str) -> Option<&VisibilityRecord> {
        self.records.get(heading_id)
    }

    /// Whether `heading_id` is currently flagged intersecting.
    #[must_use]
    pub fn is_intersecting(&self, heading_id: &str) -> bool {
        self.get(heading_id).is_some_and(|r| r.is_intersecting)
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
