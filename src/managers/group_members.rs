use std::collections::BTreeSet;

use crate::types::tab::TabId;

/// Tabs believed to host a single-playback-domain site.
///
/// Advisory only: a matching tab may not be registered yet, and a registered
/// tab may have navigated elsewhere or closed. Stale entries are pruned when
/// a message to them fails.
#[derive(Debug, Default, Clone)]
pub struct GroupMembers {
    tabs: BTreeSet<TabId>,
}

impl GroupMembers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the tab was not already a member.
    pub fn register(&mut self, tab_id: TabId) -> bool {
        self.tabs.insert(tab_id)
    }

    pub fn prune(&mut self, tab_id: TabId) -> bool {
        self.tabs.remove(&tab_id)
    }

    /// Every member except `tab_id`, in id order.
    pub fn others(&self, tab_id: TabId) -> Vec<TabId> {
        self.tabs.iter().copied().filter(|id| *id != tab_id).collect()
    }

    pub fn members(&self) -> Vec<TabId> {
        self.tabs.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }
}
