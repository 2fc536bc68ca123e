use diary_core::util::{is_http_url, normalize_text_option};

use crate::cli::ConfigCommands;
use crate::commands::common::resolve_client_config;
use crate::config_profiles::{
    session_storage_path, CliProfile, CliProfilesConfig, SessionBackend,
};
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            server_url,
            request_timeout_secs,
            search_debounce_ms,
            session_store,
            no_activate,
        } => run_config_init(
            global_profile,
            server_url,
            request_timeout_secs,
            search_debounce_ms,
            session_store,
            no_activate,
        ),
        ConfigCommands::Show => run_config_show(global_profile),
    }
}

pub fn run_config_init(
    profile_name: Option<&str>,
    server_url: Option<String>,
    request_timeout_secs: Option<u64>,
    search_debounce_ms: Option<u64>,
    session_store: Option<SessionBackend>,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile_name);

    let profile = config.profile_mut_or_default(&profile_name);
    apply_profile_updates(profile, server_url, request_timeout_secs, search_debounce_ms)?;
    if let Some(backend) = session_store {
        profile.session_store = Some(backend);
    }

    if !no_activate {
        config.active_profile = Some(profile_name.clone());
    }

    let path = config.save().map_err(CliError::Config)?;
    println!(
        "Profile '{}' initialized at {}",
        profile_name,
        path.display()
    );
    Ok(())
}

/// Validate and merge explicit values into `profile`; absent values keep
/// whatever the profile already had.
pub fn apply_profile_updates(
    profile: &mut CliProfile,
    server_url: Option<String>,
    request_timeout_secs: Option<u64>,
    search_debounce_ms: Option<u64>,
) -> Result<(), CliError> {
    if let Some(url) = normalize_text_option(server_url) {
        if !is_http_url(&url) {
            return Err(CliError::Config(
                "server_url must include http:// or https://".to_string(),
            ));
        }
        profile.server_url = Some(url.trim_end_matches('/').to_string());
    }
    if let Some(timeout) = request_timeout_secs {
        if timeout == 0 {
            return Err(CliError::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        profile.request_timeout_secs = Some(timeout);
    }
    if let Some(debounce) = search_debounce_ms {
        profile.search_debounce_ms = Some(debounce);
    }
    Ok(())
}

fn run_config_show(profile_name: Option<&str>) -> Result<(), CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile_name);
    let resolved = resolve_client_config(
        config.profile(&profile_name),
        None,
        std::env::var("DIARY_SERVER_URL").ok(),
    )?;

    let configured = if config.profile(&profile_name).is_some() {
        ""
    } else {
        " (not configured, using defaults)"
    };
    println!("Profile:         {profile_name}{configured}");
    println!("Server URL:      {}", resolved.server_url);
    println!("Request timeout: {}s", resolved.request_timeout_secs);
    println!("Search debounce: {}ms", resolved.search_debounce_ms);
    let backend = config
        .profile(&profile_name)
        .and_then(|profile| profile.session_store)
        .unwrap_or_default();
    println!("Session store:   {}", backend.as_str());
    if backend == SessionBackend::File {
        if let Ok(path) = session_storage_path(&profile_name) {
            println!("Session file:    {}", path.display());
        }
    }
    Ok(())
}
