use diary_core::controller::{Command, Response};
use diary_core::stats::{greeting, EntryStats};

use crate::commands::common::{load_entries, open_context, GlobalArgs};
use crate::error::CliError;

pub async fn run_login(global: &GlobalArgs, username: &str, password: &str) -> Result<(), CliError> {
    let mut context = open_context(global)?;
    let response = context
        .controller
        .dispatch(Command::Login {
            username: username.trim().to_string(),
            password: password.to_string(),
        })
        .await?;

    let Response::LoggedIn { username, entries } = response else {
        return Err(CliError::UnexpectedResponse);
    };
    println!(
        "Logged in profile '{}' as {} ({} entries)",
        context.profile_name,
        username,
        entries.len()
    );
    Ok(())
}

pub async fn run_register(
    global: &GlobalArgs,
    username: &str,
    password: &str,
) -> Result<(), CliError> {
    let mut context = open_context(global)?;
    context
        .controller
        .dispatch(Command::Register {
            username: username.trim().to_string(),
            password: password.to_string(),
        })
        .await?;

    println!("Registration successful! Run `diary login` to sign in.");
    Ok(())
}

pub async fn run_logout(global: &GlobalArgs) -> Result<(), CliError> {
    let mut context = open_context(global)?;
    context.controller.dispatch(Command::Logout).await?;
    println!("Logged out profile '{}'", context.profile_name);
    Ok(())
}

pub async fn run_status(global: &GlobalArgs) -> Result<(), CliError> {
    let mut context = open_context(global)?;
    if context.controller.session().logged_in_user()?.is_none() {
        println!("{}", greeting(None));
        println!(
            "Profile '{}' is not logged in to {}.",
            context.profile_name, context.config.server_url
        );
        return Ok(());
    }

    let entries = load_entries(&mut context).await?;
    let stats = EntryStats::from_entries(&entries);

    println!("{}", greeting(context.controller.current_user()));
    println!("Profile:        {}", context.profile_name);
    println!("Server:         {}", context.config.server_url);
    println!("Total entries:  {}", stats.total_entries);
    println!("Total words:    {}", stats.total_words);
    println!(
        "Average words:  {}",
        stats
            .average_words
            .map_or_else(|| "-".to_string(), |average| average.to_string())
    );
    Ok(())
}
