use std::io::Cursor;

use chrono::NaiveDate;
use clap::{CommandFactory, Parser};
use diary_core::config::ClientConfig;
use diary_core::controller::{Controller, Screen};
use diary_core::session::{DurableStorage, LOGGED_IN_USER_KEY, SESSION_TOKEN_KEY};
use diary_core::{Entry, EntryDraft, EntryId};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::cli::{Cli, Commands, CompletionShell, ExportFormat};
use crate::commands::common::{
    confirm, entry_preview, entry_to_list_item, format_entry_detail, format_entry_lines,
    load_entries, normalize_search_query, parse_entry_id, resolve_client_config, restore_session,
    CliContext,
};
use crate::commands::completions::render_completions;
use crate::commands::config::apply_profile_updates;
use crate::commands::edit::apply_edits;
use crate::commands::export::export_format;
use crate::config_profiles::{CliProfile, SessionBackend};
use crate::error::CliError;
use crate::keychain::{CliStorage, KeyringStorage};

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
}

/// Context on the in-memory keychain, logged in as `alice` unless `user` is `None`.
fn stored_session_context(server: &MockServer, profile: &str, user: Option<&str>) -> CliContext {
    let storage = CliStorage::Keyring(KeyringStorage::new(profile));
    storage.set(SESSION_TOKEN_KEY, "tok123").unwrap();
    match user {
        Some(user) => storage.set(LOGGED_IN_USER_KEY, user).unwrap(),
        None => storage.remove(LOGGED_IN_USER_KEY).unwrap(),
    }

    let config = ClientConfig {
        server_url: server.uri(),
        ..ClientConfig::default()
    };
    let controller = Controller::new(config.api_client().unwrap(), storage);
    CliContext {
        profile_name: profile.to_string(),
        config,
        controller,
    }
}

fn entry(id: i64, title: &str, content: &str) -> Entry {
    Entry {
        id: EntryId::new(id),
        encoded_title: title.to_string(),
        encoded_content: content.to_string(),
        entry_date: date(id.try_into().unwrap()),
        created_at: None,
    }
}

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn search_requires_query_unless_watching() {
    assert!(Cli::try_parse_from(["diary", "search"]).is_err());
    assert!(Cli::try_parse_from(["diary", "search", "--watch"]).is_ok());
    assert!(Cli::try_parse_from(["diary", "search", "rain", "--watch"]).is_err());
}

#[test]
fn export_accepts_text_alias() {
    let cli = Cli::try_parse_from(["diary", "export", "--format", "text"]).unwrap();
    let Commands::Export { format, output } = cli.command else {
        panic!("expected export command");
    };
    assert_eq!(format, ExportFormat::Txt);
    assert_eq!(output, None);
    assert_eq!(
        diary_core::export::ExportFormat::from(format),
        diary_core::export::ExportFormat::Text
    );
}

#[test]
fn global_flags_parse_after_subcommand() {
    let cli = Cli::try_parse_from([
        "diary",
        "list",
        "--server",
        "http://diary.local:8080",
        "--profile",
        "home",
    ])
    .unwrap();
    assert_eq!(cli.server.as_deref(), Some("http://diary.local:8080"));
    assert_eq!(cli.profile.as_deref(), Some("home"));
}

#[test]
fn add_parses_entry_date() {
    let cli = Cli::try_parse_from([
        "diary", "add", "--title", "Walk", "--content", "Park", "--date", "2024-03-02",
    ])
    .unwrap();
    let Commands::Add { date: parsed, .. } = cli.command else {
        panic!("expected add command");
    };
    assert_eq!(parsed, Some(date(2)));
}

#[test]
fn entry_lines_show_decoded_text() {
    let lines = format_entry_lines(&[entry(1, "Day%201", "It%20rained%0Aall%20day")]);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("2024-03-01"));
    assert!(lines[0].contains("Day 1"));
    assert!(lines[0].ends_with("It rained"));
}

#[test]
fn entry_lines_label_untitled_entries() {
    let lines = format_entry_lines(&[entry(2, "", "text")]);
    assert!(lines[0].contains("Untitled"));
}

#[test]
fn entry_preview_collapses_and_truncates() {
    let preview = entry_preview(&entry(1, "t", "one%20%20two%20three"), 7);
    assert_eq!(preview, "one two...");
}

#[test]
fn entry_detail_includes_human_date() {
    let detail = format_entry_detail(&entry(4, "Walk", "Park%20loop"));
    assert_eq!(detail, "Walk\nMar 4, 2024 (#4)\n\nPark loop");
}

#[test]
fn list_items_carry_decoded_fields() {
    let item = entry_to_list_item(&entry(3, "Rain%20%26%20wind", "wet"));
    assert_eq!(item.id, 3);
    assert_eq!(item.title, "Rain & wind");
    assert_eq!(item.entry_date, "2024-03-03");
    assert_eq!(item.display_date, "Mar 3, 2024");
}

#[test]
fn parse_entry_id_rejects_non_numbers() {
    assert_eq!(parse_entry_id(" 42 ").unwrap(), EntryId::new(42));
    assert!(matches!(
        parse_entry_id("abc"),
        Err(CliError::InvalidEntryId(value)) if value == "abc"
    ));
}

#[test]
fn normalize_search_query_trims_and_rejects_empty() {
    assert_eq!(normalize_search_query("  rain ").unwrap(), "rain");
    assert!(matches!(
        normalize_search_query(" \t "),
        Err(CliError::EmptySearchQuery)
    ));
}

#[test]
fn confirm_accepts_only_yes() {
    for (answer, expected) in [("y\n", true), ("YES\n", true), ("n\n", false), ("\n", false)] {
        let mut output = Vec::new();
        let confirmed = confirm("Delete?", &mut Cursor::new(answer), &mut output).unwrap();
        assert_eq!(confirmed, expected, "answer {answer:?}");
        assert_eq!(String::from_utf8(output).unwrap(), "Delete? [y/N] ");
    }
}

#[test]
fn apply_edits_keeps_unspecified_fields() {
    let current = EntryDraft::new("Walk", "Park loop", date(5));
    let edited = apply_edits(current, None, Some("Beach".to_string()), None);
    assert_eq!(edited, EntryDraft::new("Walk", "Beach", date(5)));
}

#[test]
fn profile_updates_validate_values() {
    let mut profile = CliProfile::default();
    apply_profile_updates(
        &mut profile,
        Some(" http://diary.local:8080/ ".to_string()),
        Some(4),
        None,
    )
    .unwrap();
    assert_eq!(profile.server_url.as_deref(), Some("http://diary.local:8080"));
    assert_eq!(profile.request_timeout_secs, Some(4));

    assert!(matches!(
        apply_profile_updates(&mut profile, Some("diary.local".to_string()), None, None),
        Err(CliError::Config(_))
    ));
    assert!(matches!(
        apply_profile_updates(&mut profile, None, Some(0), None),
        Err(CliError::Config(_))
    ));
    assert_eq!(profile.request_timeout_secs, Some(4));
}

#[test]
fn server_flag_beats_env_and_profile() {
    let profile = CliProfile {
        server_url: Some("http://stored:8080".to_string()),
        ..CliProfile::default()
    };

    let from_profile = resolve_client_config(Some(&profile), None, None).unwrap();
    assert_eq!(from_profile.server_url, "http://stored:8080");

    let from_env =
        resolve_client_config(Some(&profile), None, Some("http://env:8080".to_string())).unwrap();
    assert_eq!(from_env.server_url, "http://env:8080");

    let from_flag = resolve_client_config(
        Some(&profile),
        Some("http://flag:8080/".to_string()),
        Some("http://env:8080".to_string()),
    )
    .unwrap();
    assert_eq!(from_flag.server_url, "http://flag:8080");
}

#[test]
fn invalid_server_url_is_rejected() {
    assert!(matches!(
        resolve_client_config(None, Some("ftp://nope".to_string()), None),
        Err(CliError::Core(diary_core::Error::InvalidConfiguration(_)))
    ));
}

#[test]
fn completions_mention_binary_name() {
    for shell in [CompletionShell::Bash, CompletionShell::Zsh, CompletionShell::Fish] {
        let script = String::from_utf8(render_completions(shell)).unwrap();
        assert!(script.contains("diary"), "{shell:?}");
    }
}

#[test]
fn pdf_export_is_rejected_before_any_request() {
    assert!(matches!(
        export_format(ExportFormat::Pdf),
        Err(CliError::Core(diary_core::Error::UnsupportedExportFormat(_)))
    ));
    assert_eq!(
        export_format(ExportFormat::Json).unwrap(),
        diary_core::export::ExportFormat::Json
    );
}

#[test]
fn config_init_accepts_session_store() {
    let cli = Cli::try_parse_from(["diary", "config", "init", "--session-store", "file"]).unwrap();
    let Commands::Config {
        command: crate::cli::ConfigCommands::Init { session_store, .. },
    } = cli.command
    else {
        panic!("expected config init command");
    };
    assert_eq!(session_store, Some(SessionBackend::File));
}

#[tokio::test]
async fn load_entries_reports_server_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/entry/view"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database down"))
        .mount(&server)
        .await;

    let mut context = stored_session_context(&server, "cli-load-failure", Some("alice"));
    let result = load_entries(&mut context).await;

    assert!(matches!(
        result,
        Err(CliError::Core(diary_core::Error::Server { status: 500, .. }))
    ));
    assert_eq!(context.controller.screen(), Screen::Browsing);
}

#[tokio::test]
async fn load_entries_fetches_the_list_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/entry/view"))
        .and(header("Session-Token", "tok123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 7,
            "title": "Rainy%20day",
            "content": "Stayed%20in",
            "entry_date": "2024-03-07",
            "created_at": null,
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let mut context = stored_session_context(&server, "cli-load-once", Some("alice"));
    let entries = load_entries(&mut context).await.unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title(), "Rainy day");
    assert_eq!(context.controller.current_user(), Some("alice"));
}

#[tokio::test]
async fn restore_without_marker_needs_login() {
    let server = MockServer::start().await;
    let mut context = stored_session_context(&server, "cli-no-marker", None);

    assert!(matches!(
        restore_session(&mut context),
        Err(CliError::Core(diary_core::Error::NotAuthenticated))
    ));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}
