use std::io;

use diary_core::controller::{Command, Response};

use crate::commands::common::{
    confirm, load_entries, open_context, parse_entry_id, GlobalArgs,
};
use crate::error::CliError;

pub async fn run_delete(global: &GlobalArgs, id: &str, skip_prompt: bool) -> Result<(), CliError> {
    let entry_id = parse_entry_id(id)?;
    let mut context = open_context(global)?;
    load_entries(&mut context).await?;

    let Response::Editing(draft) = context
        .controller
        .dispatch(Command::OpenEntry(entry_id))
        .await?
    else {
        return Err(CliError::UnexpectedResponse);
    };

    let confirmed = skip_prompt
        || confirm(
            &format!("Delete entry {entry_id} \"{}\"?", draft.title),
            &mut io::stdin().lock(),
            &mut io::stderr(),
        )?;

    match context
        .controller
        .dispatch(Command::Delete { confirmed })
        .await?
    {
        Response::Deleted(_) => println!("Entry {entry_id} deleted"),
        Response::Cancelled => println!("Cancelled"),
        _ => return Err(CliError::UnexpectedResponse),
    }
    Ok(())
}
