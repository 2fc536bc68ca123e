use chrono::NaiveDate;
use diary_core::controller::{Command, Response};
use diary_core::EntryDraft;

use crate::commands::common::{open_context, restore_session, GlobalArgs};
use crate::error::CliError;

pub async fn run_add(
    global: &GlobalArgs,
    title: &str,
    content: &str,
    date: Option<NaiveDate>,
) -> Result<(), CliError> {
    let mut context = open_context(global)?;
    restore_session(&mut context)?;

    let Response::Editing(blank) = context.controller.dispatch(Command::NewEntry).await? else {
        return Err(CliError::UnexpectedResponse);
    };
    let draft = EntryDraft::new(title, content, date.unwrap_or(blank.entry_date));

    let Response::Saved(entries) = context.controller.dispatch(Command::Save(draft)).await? else {
        return Err(CliError::UnexpectedResponse);
    };
    println!("Entry saved ({} entries)", entries.len());
    Ok(())
}
