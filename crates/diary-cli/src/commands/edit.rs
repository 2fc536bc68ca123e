use chrono::NaiveDate;
use diary_core::controller::{Command, Response};
use diary_core::EntryDraft;

use crate::commands::common::{load_entries, open_context, parse_entry_id, GlobalArgs};
use crate::error::CliError;

pub async fn run_edit(
    global: &GlobalArgs,
    id: &str,
    title: Option<String>,
    content: Option<String>,
    date: Option<NaiveDate>,
) -> Result<(), CliError> {
    let entry_id = parse_entry_id(id)?;
    if title.is_none() && content.is_none() && date.is_none() {
        return Err(CliError::NothingToEdit);
    }

    let mut context = open_context(global)?;
    load_entries(&mut context).await?;

    let Response::Editing(current) = context
        .controller
        .dispatch(Command::OpenEntry(entry_id))
        .await?
    else {
        return Err(CliError::UnexpectedResponse);
    };
    let draft = apply_edits(current, title, content, date);

    let Response::Saved(_) = context.controller.dispatch(Command::Save(draft)).await? else {
        return Err(CliError::UnexpectedResponse);
    };
    println!("Entry {entry_id} updated");
    Ok(())
}

/// Overlay the given fields on the entry's current contents.
pub fn apply_edits(
    current: EntryDraft,
    title: Option<String>,
    content: Option<String>,
    date: Option<NaiveDate>,
) -> EntryDraft {
    EntryDraft {
        title: title.unwrap_or(current.title),
        content: content.unwrap_or(current.content),
        entry_date: date.unwrap_or(current.entry_date),
    }
}
