//! Data models for Diary

mod entry;

pub use entry::{decode_text, encode_text, Entry, EntryDraft, EntryId};
