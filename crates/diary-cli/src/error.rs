use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] diary_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid entry ID: {0}")]
    InvalidEntryId(String),
    #[error("Nothing to change; pass --title, --content or --date")]
    NothingToEdit,
    #[error("Search query cannot be empty")]
    EmptySearchQuery,
    #[error("Unexpected response from controller")]
    UnexpectedResponse,
    #[error("Configuration error: {0}")]
    Config(String),
}
