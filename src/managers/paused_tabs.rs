use std::collections::HashMap;

use crate::types::tab::{PausedTabRecord, TabId};

/// Tabs whose media the coordinator itself paused.
///
/// At most one record per tab. Records for tabs that have since closed are
/// harmless and may linger.
#[derive(Debug, Default, Clone)]
pub struct PausedTabs {
    records: HashMap<TabId, PausedTabRecord>,
}

impl PausedTabs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record, or refreshes the timestamp of an existing one.
    pub fn mark(&mut self, tab_id: TabId, now_millis: i64) {
        self.records.insert(
            tab_id,
            PausedTabRecord {
                tab_id,
                paused_at_millis: now_millis,
            },
        );
    }

    /// Removes and returns the record, so each pause is acted on once.
    pub fn take(&mut self, tab_id: TabId) -> Option<PausedTabRecord> {
        self.records.remove(&tab_id)
    }

    pub fn get(&self, tab_id: TabId) -> Option<&PausedTabRecord> {
        self.records.get(&tab_id)
    }

    pub fn contains(&self, tab_id: TabId) -> bool {
        self.records.contains_key(&tab_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records ordered by tab id.
    pub fn records(&self) -> Vec<PausedTabRecord> {
        let mut records: Vec<_> = self.records.values().copied().collect();
        records.sort_by_key(|r| r.tab_id);
        records
    }
}
