//! View controller: turns user intents into API calls and keeps the screen
//! state, the session store and the entry cache consistent.
//!
//! Front-ends build a [`Command`], hand it to [`Controller::dispatch`] and
//! render the returned [`Response`]. Any call that ends the session
//! (missing token, 401, or a lost server session) clears the store, empties
//! the cache and drops back to [`Screen::Unauthenticated`] before the error is
//! returned for display.

mod search;

pub use search::{debounce_queries, PendingSearch, SearchSequencer, SearchStart, SearchTicket};

use crate::api::DiaryApiClient;
use crate::cache::EntryCache;
use crate::export::{render_export, ExportFile, ExportFormat};
use crate::session::{DurableStorage, SessionStore};
use crate::{Entry, EntryDraft, EntryId, Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Screen {
    #[default]
    Unauthenticated,
    Browsing,
    /// Editor open; `None` for a new entry
    Editing(Option<EntryId>),
}

impl Screen {
    pub const fn is_authenticated(self) -> bool {
        !matches!(self, Self::Unauthenticated)
    }
}

/// Everything the controller mutates, in one place.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub screen: Screen,
    pub current_user: Option<String>,
    pub cache: EntryCache,
    searches: SearchSequencer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { username: String, password: String },
    Register { username: String, password: String },
    Logout,
    Refresh,
    NewEntry,
    OpenEntry(EntryId),
    Cancel,
    Save(EntryDraft),
    Delete { confirmed: bool },
    Search(String),
    Export(ExportFormat),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    LoggedIn {
        username: String,
        entries: Vec<Entry>,
    },
    Registered,
    LoggedOut,
    /// List to render
    Entries(Vec<Entry>),
    /// Editor opened with these contents
    Editing(EntryDraft),
    Saved(Vec<Entry>),
    Deleted(Vec<Entry>),
    Cancelled,
    Exported(ExportFile),
    /// A newer search superseded this one; nothing to render
    Stale,
}

pub struct Controller<S: DurableStorage> {
    api: DiaryApiClient,
    session: SessionStore<S>,
    state: AppState,
}

impl<S: DurableStorage> Controller<S> {
    pub fn new(api: DiaryApiClient, storage: S) -> Self {
        Self {
            api,
            session: SessionStore::new(storage),
            state: AppState::default(),
        }
    }

    pub const fn state(&self) -> &AppState {
        &self.state
    }

    pub const fn screen(&self) -> Screen {
        self.state.screen
    }

    pub fn current_user(&self) -> Option<&str> {
        self.state.current_user.as_deref()
    }

    pub fn cached_entries(&self) -> &[Entry] {
        self.state.cache.entries()
    }

    pub const fn session(&self) -> &SessionStore<S> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionStore<S> {
        &mut self.session
    }

    /// Restore the authenticated screen when a previous run left a user
    /// marker behind. The token is not checked with the server first.
    pub async fn resume(&mut self) -> Result<Option<Response>> {
        let Some(username) = self.restore()? else {
            return Ok(None);
        };

        let result = self.load_entries_quietly().await;
        let entries = self.settle(result).await?;
        Ok(Some(Response::LoggedIn { username, entries }))
    }

    /// Like [`Controller::resume`] but without loading the list. Returns the
    /// restored user name.
    pub fn restore(&mut self) -> Result<Option<String>> {
        let Some(username) = self.session.logged_in_user()? else {
            return Ok(None);
        };

        tracing::info!("Resuming session for {}", username);
        self.enter_browsing(username.clone());
        Ok(Some(username))
    }

    pub async fn dispatch(&mut self, command: Command) -> Result<Response> {
        let result = match command {
            Command::Login { username, password } => self.login(username, &password).await,
            Command::Register { username, password } => self
                .api
                .register(&username, &password)
                .await
                .map(|()| Response::Registered),
            Command::Logout => self.logout().await,
            Command::Refresh => self.refresh().await,
            Command::NewEntry => self.new_entry(),
            Command::OpenEntry(id) => self.open_entry(id),
            Command::Cancel => self.cancel(),
            Command::Save(draft) => self.save(draft).await,
            Command::Delete { confirmed } => self.delete(confirmed).await,
            Command::Search(query) => self.search(&query).await,
            Command::Export(format) => self.export(format).await,
        };
        self.settle(result).await
    }

    /// First half of a search that may overlap with others. An empty query
    /// is answered from the cache; otherwise the returned [`PendingSearch`]
    /// can run without borrowing the controller.
    pub async fn begin_search(&mut self, query: &str) -> Result<SearchStart> {
        let result = self.start_search(query);
        self.settle(result).await
    }

    /// Second half of a search. Results of a search that has since been
    /// superseded come back as [`Response::Stale`].
    pub async fn finish_search(
        &mut self,
        ticket: SearchTicket,
        result: Result<Vec<Entry>>,
    ) -> Result<Response> {
        let response = self.complete_search(ticket, result);
        self.settle(response).await
    }

    async fn login(&mut self, username: String, password: &str) -> Result<Response> {
        let outcome = self.api.login(&username, password).await?;
        match outcome.token {
            Some(token) => self.session.set_token(token)?,
            None => tracing::warn!("Login succeeded without a Session-Token header"),
        }
        self.session.set_logged_in_user(&username)?;

        tracing::info!("Logged in as {}", username);
        self.enter_browsing(username.clone());
        let entries = self.load_entries_quietly().await?;
        Ok(Response::LoggedIn { username, entries })
    }

    async fn logout(&mut self) -> Result<Response> {
        let token = self.session.token().unwrap_or_else(|error| {
            tracing::warn!("Failed to read session token during logout: {}", error);
            None
        });
        if let Err(error) = self.api.logout(token.as_deref()).await {
            tracing::warn!("Logout request failed: {}", error);
        }

        self.end_session()?;
        tracing::info!("Logged out");
        Ok(Response::LoggedOut)
    }

    async fn refresh(&mut self) -> Result<Response> {
        self.require_authenticated()?;
        let entries = self.reload_entries().await?;
        Ok(Response::Entries(entries))
    }

    fn new_entry(&mut self) -> Result<Response> {
        self.require_authenticated()?;
        self.state.screen = Screen::Editing(None);
        Ok(Response::Editing(EntryDraft::today()))
    }

    fn open_entry(&mut self, id: EntryId) -> Result<Response> {
        self.require_authenticated()?;
        let draft = self
            .state
            .cache
            .find(id)
            .map(Entry::to_draft)
            .ok_or(Error::EntryNotFound(id))?;
        self.state.screen = Screen::Editing(Some(id));
        Ok(Response::Editing(draft))
    }

    fn cancel(&mut self) -> Result<Response> {
        self.require_authenticated()?;
        self.state.screen = Screen::Browsing;
        Ok(Response::Cancelled)
    }

    async fn save(&mut self, draft: EntryDraft) -> Result<Response> {
        let Screen::Editing(editing) = self.state.screen else {
            self.require_authenticated()?;
            return Err(Error::Validation(
                "No entry is open for editing".to_string(),
            ));
        };
        draft.validate()?;

        let token = self.session.token()?;
        match editing {
            Some(id) => self.api.edit_entry(token.as_deref(), id, &draft).await?,
            None => self.api.create_entry(token.as_deref(), &draft).await?,
        }
        tracing::info!("Saved entry {:?}", editing);

        self.state.screen = Screen::Browsing;
        let entries = self.reload_entries().await?;
        Ok(Response::Saved(entries))
    }

    async fn delete(&mut self, confirmed: bool) -> Result<Response> {
        let Screen::Editing(Some(id)) = self.state.screen else {
            self.require_authenticated()?;
            return Err(Error::Validation(
                "Open an existing entry to delete it".to_string(),
            ));
        };
        if !confirmed {
            return Ok(Response::Cancelled);
        }

        let token = self.session.token()?;
        self.api.delete_entry(token.as_deref(), id).await?;
        tracing::info!("Deleted entry {}", id);

        self.state.screen = Screen::Browsing;
        let entries = self.reload_entries().await?;
        Ok(Response::Deleted(entries))
    }

    async fn search(&mut self, query: &str) -> Result<Response> {
        match self.start_search(query)? {
            SearchStart::Cached(entries) => Ok(Response::Entries(entries)),
            SearchStart::Pending(pending) => {
                let result = pending.run().await;
                self.complete_search(pending.ticket(), result)
            }
        }
    }

    fn complete_search(
        &self,
        ticket: SearchTicket,
        result: Result<Vec<Entry>>,
    ) -> Result<Response> {
        if !self.state.searches.is_latest(ticket) {
            tracing::debug!("Dropping results for superseded search {:?}", ticket);
            return Ok(Response::Stale);
        }
        Ok(Response::Entries(result?))
    }

    fn start_search(&mut self, query: &str) -> Result<SearchStart> {
        self.require_authenticated()?;
        // Every query supersedes the searches before it, the empty one too.
        let ticket = self.state.searches.issue();
        let query = query.trim();
        if query.is_empty() {
            return Ok(SearchStart::Cached(self.state.cache.entries().to_vec()));
        }

        let token = self.session.token()?;
        Ok(SearchStart::Pending(PendingSearch::new(
            self.api.clone(),
            ticket,
            query,
            token,
        )))
    }

    async fn export(&mut self, format: ExportFormat) -> Result<Response> {
        self.require_authenticated()?;
        format.ensure_supported()?;

        let token = self.session.token()?;
        let entries = self.api.export_entries(token.as_deref()).await?;
        Ok(Response::Exported(render_export(&entries, format)?))
    }

    async fn reload_entries(&mut self) -> Result<Vec<Entry>> {
        let token = self.session.token()?;
        let entries = self.api.list_entries(token.as_deref()).await?;
        self.state.cache.replace(entries.clone());
        Ok(entries)
    }

    /// Load the list right after entering the authenticated screen. Failures
    /// other than session loss are logged and leave the list empty.
    async fn load_entries_quietly(&mut self) -> Result<Vec<Entry>> {
        match self.reload_entries().await {
            Ok(entries) => Ok(entries),
            Err(error) if error.is_session_failure() => Err(error),
            Err(error) => {
                tracing::warn!("Failed to load entries: {}", error);
                Ok(Vec::new())
            }
        }
    }

    fn enter_browsing(&mut self, username: String) {
        self.state.current_user = Some(username);
        self.state.screen = Screen::Browsing;
    }

    fn require_authenticated(&self) -> Result<()> {
        if self.state.screen.is_authenticated() {
            Ok(())
        } else {
            Err(Error::NotAuthenticated)
        }
    }

    fn end_session(&mut self) -> Result<()> {
        self.state.screen = Screen::Unauthenticated;
        self.state.current_user = None;
        self.state.cache.clear();
        self.session.clear()?;
        self.session.clear_logged_in_user()
    }

    async fn settle<T>(&mut self, result: Result<T>) -> Result<T> {
        let Err(error) = &result else {
            return result;
        };
        if !error.is_session_failure() {
            return result;
        }

        tracing::info!("Session ended: {}", error);
        if matches!(error, Error::SessionLost) {
            // The server forgot the session; tell it to drop the token too.
            let token = self.session.token().ok().flatten();
            if let Err(logout_error) = self.api.logout(token.as_deref()).await {
                tracing::warn!("Logout request failed: {}", logout_error);
            }
        }
        if let Err(clear_error) = self.end_session() {
            tracing::warn!("Failed to clear stored session: {}", clear_error);
        }
        result
    }
}
