use diary_core::controller::{debounce_queries, Command, Response, SearchStart};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::commands::common::{
    load_entries, normalize_search_query, open_context, print_entries, restore_session, GlobalArgs,
};
use crate::error::CliError;

const QUERY_BUFFER: usize = 32;

pub async fn run_search(global: &GlobalArgs, query: &str, as_json: bool) -> Result<(), CliError> {
    let normalized_query = normalize_search_query(query)?;
    let mut context = open_context(global)?;
    restore_session(&mut context)?;

    match context
        .controller
        .dispatch(Command::Search(normalized_query))
        .await?
    {
        Response::Entries(entries) => print_entries(&entries, as_json),
        _ => Err(CliError::UnexpectedResponse),
    }
}

/// Treat each stdin line as the current contents of a search box. Lines that
/// arrive within the debounce window replace each other; an empty line shows
/// every entry again. Searches run concurrently and results of a superseded
/// query are dropped.
pub async fn run_search_watch(global: &GlobalArgs, as_json: bool) -> Result<(), CliError> {
    let mut context = open_context(global)?;
    load_entries(&mut context).await?;

    let (sender, mut updates) = mpsc::channel(QUERY_BUFFER);
    let reader = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if sender.send(line).await.is_err() {
                break;
            }
        }
        Ok::<(), std::io::Error>(())
    });

    let (settled_sender, mut settled) = mpsc::channel(QUERY_BUFFER);
    let quiet = context.config.search_debounce();
    tokio::spawn(async move {
        while let Some(query) = debounce_queries(&mut updates, quiet).await {
            if settled_sender.send(query).await.is_err() {
                break;
            }
        }
    });

    let mut in_flight = JoinSet::new();
    let mut input_open = true;
    loop {
        tokio::select! {
            query = settled.recv(), if input_open => {
                let Some(query) = query else {
                    input_open = false;
                    continue;
                };
                match context.controller.begin_search(&query).await? {
                    SearchStart::Cached(entries) => print_entries(&entries, as_json)?,
                    SearchStart::Pending(pending) => {
                        in_flight.spawn(async move {
                            let result = pending.run().await;
                            (pending.ticket(), result)
                        });
                    }
                }
            }
            Some(joined) = in_flight.join_next() => {
                let (ticket, result) = match joined {
                    Ok(finished) => finished,
                    Err(error) => {
                        tracing::warn!("Search task stopped: {}", error);
                        continue;
                    }
                };
                match context.controller.finish_search(ticket, result).await? {
                    Response::Entries(entries) => print_entries(&entries, as_json)?,
                    Response::Stale => {}
                    _ => return Err(CliError::UnexpectedResponse),
                }
            }
            else => break,
        }
    }

    match reader.await {
        Ok(result) => result?,
        Err(error) => tracing::warn!("stdin reader stopped: {}", error),
    }
    Ok(())
}
