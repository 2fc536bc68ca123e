//! Search request ordering and input debouncing.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::api::DiaryApiClient;
use crate::{Entry, Result};

/// Identifies one dispatched search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket(u64);

/// Hands out monotonically increasing tickets so that a response to a
/// superseded search can be recognised and dropped.
#[derive(Debug, Clone, Default)]
pub struct SearchSequencer {
    latest: u64,
}

impl SearchSequencer {
    pub fn issue(&mut self) -> SearchTicket {
        self.latest += 1;
        SearchTicket(self.latest)
    }

    pub const fn is_latest(&self, ticket: SearchTicket) -> bool {
        ticket.0 == self.latest
    }
}

/// Outcome of [`super::Controller::begin_search`].
#[derive(Debug)]
pub enum SearchStart {
    /// Empty query: the cached list, no request needed
    Cached(Vec<Entry>),
    Pending(PendingSearch),
}

/// A server search that has been sequenced but not sent yet.
#[derive(Clone)]
pub struct PendingSearch {
    api: DiaryApiClient,
    ticket: SearchTicket,
    query: String,
    token: Option<String>,
}

impl std::fmt::Debug for PendingSearch {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("PendingSearch")
            .field("ticket", &self.ticket)
            .field("query", &self.query)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl PendingSearch {
    pub(crate) fn new(
        api: DiaryApiClient,
        ticket: SearchTicket,
        query: &str,
        token: Option<String>,
    ) -> Self {
        Self {
            api,
            ticket,
            query: query.to_string(),
            token,
        }
    }

    pub const fn ticket(&self) -> SearchTicket {
        self.ticket
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub async fn run(&self) -> Result<Vec<Entry>> {
        self.api
            .search_entries(self.token.as_deref(), &self.query)
            .await
    }
}

/// Wait for the next query update, then keep taking newer ones until `quiet`
/// elapses without input. Returns the last value seen, or `None` once the
/// sender side is closed and drained.
pub async fn debounce_queries(
    updates: &mut mpsc::Receiver<String>,
    quiet: Duration,
) -> Option<String> {
    let mut latest = updates.recv().await?;
    loop {
        match tokio::time::timeout(quiet, updates.recv()).await {
            Ok(Some(next)) => latest = next,
            Ok(None) | Err(_) => return Some(latest),
        }
    }
}
