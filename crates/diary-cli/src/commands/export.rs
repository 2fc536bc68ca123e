use std::path::Path;

use diary_core::controller::{Command, Response};

use crate::cli::ExportFormat;
use crate::commands::common::{open_context, restore_session, GlobalArgs};
use crate::error::CliError;

pub async fn run_export(
    global: &GlobalArgs,
    format: ExportFormat,
    output_path: Option<&Path>,
) -> Result<(), CliError> {
    let format = export_format(format)?;
    let mut context = open_context(global)?;
    restore_session(&mut context)?;

    let Response::Exported(file) = context
        .controller
        .dispatch(Command::Export(format))
        .await?
    else {
        return Err(CliError::UnexpectedResponse);
    };

    if let Some(path) = output_path {
        let path = if path.is_dir() {
            path.join(&file.file_name)
        } else {
            path.to_path_buf()
        };
        std::fs::write(&path, file.contents)?;
        println!("{}", path.display());
    } else {
        println!("{}", file.contents);
    }

    Ok(())
}

/// Map the flag to a renderable format before any session or network work.
pub fn export_format(format: ExportFormat) -> Result<diary_core::export::ExportFormat, CliError> {
    let format = diary_core::export::ExportFormat::from(format);
    format.ensure_supported()?;
    Ok(format)
}
