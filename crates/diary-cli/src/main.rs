//! Diary CLI - keep a personal diary from the terminal
//!
//! Talks to a self-hosted diary server and remembers the session between runs.

mod cli;
mod commands;
mod config_profiles;
mod error;
mod keychain;
#[cfg(test)]
mod tests;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::auth_cmd::{run_login, run_logout, run_register, run_status};
use crate::commands::common::GlobalArgs;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::export::run_export;
use crate::commands::list::run_list;
use crate::commands::search::{run_search, run_search_watch};
use crate::commands::show::run_show;
use crate::error::CliError;

const DEFAULT_LOG_DIRECTIVE: &str = "diary=info";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = DEFAULT_LOG_DIRECTIVE.parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let global = GlobalArgs {
        server: cli.server,
        profile: cli.profile,
    };

    match cli.command {
        Commands::Login { username, password } => run_login(&global, &username, &password).await?,
        Commands::Register { username, password } => {
            run_register(&global, &username, &password).await?;
        }
        Commands::Logout => run_logout(&global).await?,
        Commands::Status => run_status(&global).await?,
        Commands::List { json } => run_list(&global, json).await?,
        Commands::Show { id } => run_show(&global, &id).await?,
        Commands::Add {
            title,
            content,
            date,
        } => run_add(&global, &title, &content, date).await?,
        Commands::Edit {
            id,
            title,
            content,
            date,
        } => run_edit(&global, &id, title, content, date).await?,
        Commands::Delete { id, yes } => run_delete(&global, &id, yes).await?,
        Commands::Search { watch: true, json, .. } => run_search_watch(&global, json).await?,
        Commands::Search { query, json, .. } => {
            run_search(&global, query.as_deref().unwrap_or_default(), json).await?;
        }
        Commands::Export { format, output } => {
            run_export(&global, format, output.as_deref()).await?;
        }
        Commands::Config { command } => run_config(command, global.profile.as_deref())?,
        Commands::Completions { shell, output } => run_completions(shell, output.as_deref())?,
    }

    Ok(())
}
