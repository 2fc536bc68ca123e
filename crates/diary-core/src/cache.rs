//! Local mirror of the last entry list fetched from the server.

use crate::{Entry, EntryId};

#[derive(Debug, Clone, Default)]
pub struct EntryCache {
    entries: Vec<Entry>,
}

impl EntryCache {
    /// Replace the whole mirror with a fresh server list.
    pub fn replace(&mut self, entries: Vec<Entry>) {
        self.entries = entries;
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn find(&self, id: EntryId) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
