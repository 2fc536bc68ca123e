//! diary-core - Core library for Diary
//!
//! This crate contains the entry models, the session store, the HTTP client
//! for the diary server and the view controller that every front-end drives.

pub mod api;
pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod export;
pub mod models;
pub mod session;
pub mod stats;
pub mod util;

pub use error::{Error, Result};
pub use models::{Entry, EntryDraft, EntryId};
