use std::collections::VecDeque;

use super::record::{LabelId, LabelRecord};

/// Maximum number of labels kept in history
pub const HISTORY_CAPACITY: usize = 10;

/// Recently printed labels, newest first
#[derive(Debug, Clone, Default)]
pub struct LabelHistory {
    records: VecDeque<LabelRecord>,
}

impl LabelHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a record, returning the oldest one if it had to be evicted
    pub fn insert(&mut self, record: LabelRecord) -> Option<LabelRecord> {
        self.records.push_front(record);
        if self.records.len() > HISTORY_CAPACITY {
            self.records.pop_back()
        } else {
            None
        }
    }

    /// Remove by id. Absent ids are ignored.
    pub fn remove(&mut self, id: &LabelId) -> Option<LabelRecord> {
        let index = self.records.iter().position(|r| &r.id == id)?;
        self.records.remove(index)
    }

    pub fn get(&self, id: &LabelId) -> Option<&LabelRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    /// Record at a display position (0 = newest)
    pub fn at(&self, index: usize) -> Option<&LabelRecord> {
        self.records.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LabelRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
