use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Observation, TrackedItem};

/// Latest observation per tracked item. Absence means the item was never
/// successfully observed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceStore {
    entries: BTreeMap<TrackedItem, Observation>,
}

impl PriceStore {
    pub fn get(&self, item: &TrackedItem) -> Option<&Observation> {
        self.entries.get(item)
    }

    /// Overwrites any prior observation and returns it.
    pub fn record(&mut self, observation: Observation) -> Option<Observation> {
        self.entries.insert(observation.url.clone(), observation)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Where the next batch resumes in the ordered item list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressCursor {
    pub next_index: usize,
}

impl ProgressCursor {
    pub fn at(next_index: usize) -> Self {
        Self { next_index }
    }

    /// Start of the next batch. A cursor past the end (the list shrank since
    /// it was written) starts over.
    pub fn start_for(&self, item_count: usize) -> usize {
        if self.next_index >= item_count {
            0
        } else {
            self.next_index
        }
    }

    /// Cursor after a batch ending at `end`, wrapping to 0 once the full
    /// list has been visited.
    pub fn after_batch(end: usize, item_count: usize) -> Self {
        if end >= item_count {
            Self::at(0)
        } else {
            Self::at(end)
        }
    }
}
