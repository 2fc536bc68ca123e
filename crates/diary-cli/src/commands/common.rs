use std::io::{self, BufRead, Write};

use diary_core::config::ClientConfig;
use diary_core::controller::{Command, Controller, Response};
use diary_core::export::format_entry_date;
use diary_core::util::{normalize_text_option, truncate_text};
use diary_core::{Entry, EntryId};
use serde::Serialize;

use crate::config_profiles::{session_storage, CliProfile, CliProfilesConfig};
use crate::error::CliError;
use crate::keychain::CliStorage;

const TITLE_COLUMN_WIDTH: usize = 32;
const PREVIEW_CHARS: usize = 48;

/// Flags shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    pub server: Option<String>,
    pub profile: Option<String>,
}

pub struct CliContext {
    pub profile_name: String,
    pub config: ClientConfig,
    pub controller: Controller<CliStorage>,
}

#[derive(Debug, Serialize)]
pub struct EntryListItem {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub entry_date: String,
    pub display_date: String,
    pub created_at: Option<String>,
}

/// Load the profile, resolve the client config and build a controller on
/// the profile's session storage.
pub fn open_context(global: &GlobalArgs) -> Result<CliContext, CliError> {
    let profiles = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = profiles.resolve_profile_name(global.profile.as_deref());
    let profile = profiles.profile(&profile_name);
    let config = resolve_client_config(
        profile,
        global.server.clone(),
        std::env::var("DIARY_SERVER_URL").ok(),
    )?;

    let backend = profile
        .and_then(|profile| profile.session_store)
        .unwrap_or_default();
    tracing::debug!(
        "Using profile '{}' against {} (session in {})",
        profile_name,
        config.server_url,
        backend.as_str()
    );

    let storage = session_storage(&profile_name, backend).map_err(CliError::Config)?;
    let controller = Controller::new(config.api_client()?, storage);
    Ok(CliContext {
        profile_name,
        config,
        controller,
    })
}

/// `--server` beats `DIARY_SERVER_URL`, which beats the stored profile.
pub fn resolve_client_config(
    profile: Option<&CliProfile>,
    server_flag: Option<String>,
    server_env: Option<String>,
) -> Result<ClientConfig, CliError> {
    let server_override =
        normalize_text_option(server_flag).or_else(|| normalize_text_option(server_env));
    let config = profile
        .cloned()
        .unwrap_or_default()
        .client_config(server_override);
    Ok(config.validated()?)
}

/// Restore the stored session without contacting the server.
pub fn restore_session(context: &mut CliContext) -> Result<String, CliError> {
    context
        .controller
        .restore()?
        .ok_or_else(|| diary_core::Error::NotAuthenticated.into())
}

/// Restore the stored session and load the entry list once. Load failures
/// reach the caller instead of leaving an empty list.
pub async fn load_entries(context: &mut CliContext) -> Result<Vec<Entry>, CliError> {
    restore_session(context)?;
    match context.controller.dispatch(Command::Refresh).await? {
        Response::Entries(entries) => Ok(entries),
        _ => Err(CliError::UnexpectedResponse),
    }
}

pub fn parse_entry_id(value: &str) -> Result<EntryId, CliError> {
    value
        .parse::<EntryId>()
        .map_err(|_| CliError::InvalidEntryId(value.trim().to_string()))
}

pub fn normalize_search_query(query: &str) -> Result<String, CliError> {
    normalize_text_option(Some(query.to_string())).ok_or(CliError::EmptySearchQuery)
}

pub fn format_entry_lines(entries: &[Entry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| {
            let title = truncate_text(&entry.display_title(), TITLE_COLUMN_WIDTH);
            let preview = entry_preview(entry, PREVIEW_CHARS);
            format!(
                "{:>5}  {}  {title:<width$}  {preview}",
                entry.id.get(),
                entry.entry_date,
                width = TITLE_COLUMN_WIDTH + 3
            )
        })
        .collect()
}

/// First line of the decoded content with whitespace collapsed.
pub fn entry_preview(entry: &Entry, max_chars: usize) -> String {
    let content = entry.content();
    let first_line = content.lines().next().unwrap_or("").trim();
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_text(&collapsed, max_chars)
}

pub fn format_entry_detail(entry: &Entry) -> String {
    format!(
        "{}\n{} (#{})\n\n{}",
        entry.display_title(),
        format_entry_date(entry.entry_date),
        entry.id,
        entry.content()
    )
}

pub fn entry_to_list_item(entry: &Entry) -> EntryListItem {
    EntryListItem {
        id: entry.id.get(),
        title: entry.title(),
        content: entry.content(),
        entry_date: entry.entry_date.to_string(),
        display_date: format_entry_date(entry.entry_date),
        created_at: entry.created_at.clone(),
    }
}

pub fn print_entries(entries: &[Entry], as_json: bool) -> Result<(), CliError> {
    if as_json {
        let json_items = entries
            .iter()
            .map(entry_to_list_item)
            .collect::<Vec<EntryListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else if entries.is_empty() {
        println!("No entries yet.");
    } else {
        for line in format_entry_lines(entries) {
            println!("{line}");
        }
    }
    Ok(())
}

/// Ask a yes/no question; anything but `y`/`yes` counts as no.
pub fn confirm(
    prompt: &str,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> io::Result<bool> {
    write!(output, "{prompt} [y/N] ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
