use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use crate::config_profiles::SessionBackend;

#[derive(Parser)]
#[command(name = "diary")]
#[command(about = "Keep a personal diary on a self-hosted diary server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Server base URL, overrides the profile and DIARY_SERVER_URL
    #[arg(long, global = true, value_name = "URL")]
    pub server: Option<String>,

    /// CLI profile name
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and remember the session
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Create an account on the server
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// End the session and forget the stored token
    Logout,
    /// Show who is logged in and entry statistics
    Status,
    /// List entries, newest first as ordered by the server
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print one entry
    Show {
        /// Entry ID
        id: String,
    },
    /// Create a new entry
    #[command(alias = "new")]
    Add {
        #[arg(short, long)]
        title: String,
        #[arg(short, long)]
        content: String,
        /// Entry date (YYYY-MM-DD), today when omitted
        #[arg(short, long, value_name = "DATE")]
        date: Option<NaiveDate>,
    },
    /// Change fields of an existing entry
    Edit {
        /// Entry ID
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        content: Option<String>,
        #[arg(short, long, value_name = "DATE")]
        date: Option<NaiveDate>,
    },
    /// Delete an entry
    Delete {
        /// Entry ID
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Search entries on the server
    Search {
        /// Search query
        #[arg(required_unless_present = "watch")]
        query: Option<String>,
        /// Read queries line by line from stdin and search as they settle
        #[arg(long, conflicts_with = "query")]
        watch: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export all entries
    Export {
        /// Export format
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Configure CLI profiles (select one with --profile)
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExportFormat {
    Json,
    #[value(alias = "text")]
    Txt,
    Pdf,
}

impl From<ExportFormat> for diary_core::export::ExportFormat {
    fn from(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Json => Self::Json,
            ExportFormat::Txt => Self::Text,
            ExportFormat::Pdf => Self::Pdf,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update a profile
    Init {
        /// Diary server base URL
        #[arg(long, value_name = "URL")]
        server_url: Option<String>,
        /// Request timeout in seconds
        #[arg(long, value_name = "SECS")]
        request_timeout_secs: Option<u64>,
        /// Quiet period for `search --watch` in milliseconds
        #[arg(long, value_name = "MS")]
        search_debounce_ms: Option<u64>,
        /// Where the session token is kept between runs
        #[arg(long, value_enum, value_name = "BACKEND")]
        session_store: Option<SessionBackend>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
    /// Print the resolved configuration for the selected profile
    Show,
}
