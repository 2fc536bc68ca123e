use crate::commands::common::{load_entries, open_context, print_entries, GlobalArgs};
use crate::error::CliError;

pub async fn run_list(global: &GlobalArgs, as_json: bool) -> Result<(), CliError> {
    let mut context = open_context(global)?;
    let entries = load_entries(&mut context).await?;
    print_entries(&entries, as_json)
}
