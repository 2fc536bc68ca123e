//! Summary numbers shown next to the entry list.

use crate::Entry;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryStats {
    pub total_entries: usize,
    pub total_words: usize,
    /// Rounded words per entry, `None` without entries
    pub average_words: Option<usize>,
}

impl EntryStats {
    #[must_use]
    pub fn from_entries(entries: &[Entry]) -> Self {
        let total_entries = entries.len();
        let total_words = entries
            .iter()
            .map(|entry| entry.content().split_whitespace().count())
            .sum::<usize>();
        let average_words = (total_entries > 0)
            .then(|| (total_words + total_entries / 2) / total_entries);

        Self {
            total_entries,
            total_words,
            average_words,
        }
    }
}

/// Greeting for the given user, or a generic one.
#[must_use]
pub fn greeting(username: Option<&str>) -> String {
    username.map_or_else(
        || "Welcome!".to_string(),
        |user| format!("Welcome back, {user}"),
    )
}
