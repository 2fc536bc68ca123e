//! Diary entry model

use std::borrow::Cow;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Server-assigned entry identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(i64);

impl EntryId {
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// A diary entry exactly as the server stores it.
///
/// `title` and `content` stay percent-encoded; use [`Entry::title`] and
/// [`Entry::content`] for display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Unique identifier
    pub id: EntryId,
    /// Percent-encoded title
    #[serde(rename = "title")]
    pub encoded_title: String,
    /// Percent-encoded content
    #[serde(rename = "content")]
    pub encoded_content: String,
    /// Calendar date the entry is about
    pub entry_date: NaiveDate,
    /// Server creation timestamp, as sent by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Entry {
    /// Decoded title
    #[must_use]
    pub fn title(&self) -> String {
        decode_text(&self.encoded_title)
    }

    /// Decoded title, or `Untitled` when it is empty
    #[must_use]
    pub fn display_title(&self) -> String {
        let title = self.title();
        if title.is_empty() {
            "Untitled".to_string()
        } else {
            title
        }
    }

    /// Decoded content
    #[must_use]
    pub fn content(&self) -> String {
        decode_text(&self.encoded_content)
    }

    /// Editor contents for this entry
    #[must_use]
    pub fn to_draft(&self) -> EntryDraft {
        EntryDraft {
            title: self.title(),
            content: self.content(),
            entry_date: self.entry_date,
        }
    }
}

/// Decoded editor contents, ready to be validated and submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDraft {
    pub title: String,
    pub content: String,
    pub entry_date: NaiveDate,
}

impl EntryDraft {
    #[must_use]
    pub fn new(title: impl Into<String>, content: impl Into<String>, entry_date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            entry_date,
        }
    }

    /// Empty draft dated today, as shown when starting a new entry
    #[must_use]
    pub fn today() -> Self {
        Self::new("", "", chrono::Local::now().date_naive())
    }

    /// Reject drafts with a blank title or blank content.
    pub fn validate(&self) -> crate::Result<()> {
        if self.title.trim().is_empty() || self.content.trim().is_empty() {
            return Err(crate::Error::Validation(
                "Please fill in both title and content".to_string(),
            ));
        }
        Ok(())
    }
}

/// Percent-encode text for submission.
#[must_use]
pub fn encode_text(text: &str) -> String {
    urlencoding::encode(text).into_owned()
}

/// Decode percent-encoded text for display.
///
/// Malformed escapes fall back to the raw text.
#[must_use]
pub fn decode_text(text: &str) -> String {
    urlencoding::decode(text).map_or_else(|_| text.to_string(), Cow::into_owned)
}
