use diary_core::Error;

use crate::commands::common::{
    format_entry_detail, load_entries, open_context, parse_entry_id, GlobalArgs,
};
use crate::error::CliError;

pub async fn run_show(global: &GlobalArgs, id: &str) -> Result<(), CliError> {
    let entry_id = parse_entry_id(id)?;
    let mut context = open_context(global)?;
    let entries = load_entries(&mut context).await?;

    let entry = entries
        .iter()
        .find(|entry| entry.id == entry_id)
        .ok_or(Error::EntryNotFound(entry_id))?;
    println!("{}", format_entry_detail(entry));
    Ok(())
}
