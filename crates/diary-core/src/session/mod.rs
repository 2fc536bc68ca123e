//! Session token persistence.
//!
//! The [`SessionStore`] is the single source of truth for "is a user logged
//! in". It keeps the token in memory and mirrors it into a
//! [`DurableStorage`] backend so a later run can pick it up again.

mod storage;

pub use storage::{DurableStorage, FileStorage, MemoryStorage};

use crate::Result;

pub const SESSION_TOKEN_KEY: &str = "session_token";
pub const LOGGED_IN_USER_KEY: &str = "logged_in_user";

#[derive(Debug, Clone)]
pub struct SessionStore<S: DurableStorage> {
    storage: S,
    token: Option<String>,
}

impl<S: DurableStorage> SessionStore<S> {
    pub const fn new(storage: S) -> Self {
        Self {
            storage,
            token: None,
        }
    }

    /// Store `token` in memory and in durable storage, replacing any previous one.
    pub fn set_token(&mut self, token: impl Into<String>) -> Result<()> {
        let token = token.into();
        self.storage.set(SESSION_TOKEN_KEY, &token)?;
        self.token = Some(token);
        Ok(())
    }

    /// Current token, recovered from durable storage when memory is empty.
    pub fn token(&mut self) -> Result<Option<String>> {
        if self.token.is_none() {
            self.token = self
                .storage
                .get(SESSION_TOKEN_KEY)?
                .filter(|token| !token.trim().is_empty());
        }
        Ok(self.token.clone())
    }

    /// Forget the token in memory and in durable storage.
    pub fn clear(&mut self) -> Result<()> {
        self.token = None;
        self.storage.remove(SESSION_TOKEN_KEY)
    }

    pub fn set_logged_in_user(&self, username: &str) -> Result<()> {
        self.storage.set(LOGGED_IN_USER_KEY, username)
    }

    pub fn logged_in_user(&self) -> Result<Option<String>> {
        Ok(self
            .storage
            .get(LOGGED_IN_USER_KEY)?
            .filter(|user| !user.trim().is_empty()))
    }

    pub fn clear_logged_in_user(&self) -> Result<()> {
        self.storage.remove(LOGGED_IN_USER_KEY)
    }

    pub const fn storage(&self) -> &S {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_token_writes_through_to_storage() {
        let storage = MemoryStorage::default();
        let mut store = SessionStore::new(storage.clone());

        store.set_token("tok123").unwrap();

        assert_eq!(store.token().unwrap().as_deref(), Some("tok123"));
        assert_eq!(
            storage.get(SESSION_TOKEN_KEY).unwrap().as_deref(),
            Some("tok123")
        );
    }

    #[test]
    fn token_is_recovered_from_storage_after_reload() {
        let storage = MemoryStorage::default();
        SessionStore::new(storage.clone()).set_token("persisted").unwrap();

        let mut reloaded = SessionStore::new(storage);
        assert_eq!(reloaded.token().unwrap().as_deref(), Some("persisted"));
    }

    #[test]
    fn set_token_overwrites_previous_token() {
        let mut store = SessionStore::new(MemoryStorage::default());
        store.set_token("first").unwrap();
        store.set_token("second").unwrap();
        assert_eq!(store.token().unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn clear_removes_memory_and_durable_copy() {
        let storage = MemoryStorage::default();
        let mut store = SessionStore::new(storage.clone());
        store.set_token("tok").unwrap();

        store.clear().unwrap();

        assert_eq!(store.token().unwrap(), None);
        assert_eq!(storage.get(SESSION_TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn blank_stored_token_counts_as_absent() {
        let storage = MemoryStorage::default();
        storage.set(SESSION_TOKEN_KEY, "  ").unwrap();
        let mut store = SessionStore::new(storage);
        assert_eq!(store.token().unwrap(), None);
    }

    #[test]
    fn logged_in_user_roundtrip() {
        let store = SessionStore::new(MemoryStorage::default());
        assert_eq!(store.logged_in_user().unwrap(), None);

        store.set_logged_in_user("alice").unwrap();
        assert_eq!(store.logged_in_user().unwrap().as_deref(), Some("alice"));

        store.clear_logged_in_user().unwrap();
        assert_eq!(store.logged_in_user().unwrap(), None);
    }
}
