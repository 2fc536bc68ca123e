//! Entry export rendering.

use std::fmt::Write as _;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Entry, Error, Result};

const TEXT_SEPARATOR_WIDTH: usize = 50;

/// Export format picked by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Text,
    /// Accepted for selection, rendering is not implemented
    Pdf,
}

impl ExportFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "txt",
            Self::Pdf => "pdf",
        }
    }

    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Text => "text/plain",
            Self::Pdf => "application/pdf",
        }
    }

    /// Fail early for formats that cannot be rendered.
    pub fn ensure_supported(self) -> Result<()> {
        match self {
            Self::Json | Self::Text => Ok(()),
            Self::Pdf => Err(Error::UnsupportedExportFormat("PDF".to_string())),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "txt" | "text" => Ok(Self::Text),
            "pdf" => Ok(Self::Pdf),
            other => Err(Error::Validation(format!("Unknown export format: {other}"))),
        }
    }
}

/// Rendered export, ready to be written wherever the front-end wants it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub contents: String,
}

/// Decoded entry as it appears in a JSON export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportEntry {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub entry_date: NaiveDate,
}

#[must_use]
pub fn entry_to_export_item(entry: &Entry) -> ExportEntry {
    ExportEntry {
        id: entry.id.get(),
        title: entry.title(),
        content: entry.content(),
        entry_date: entry.entry_date,
    }
}

/// Render entries as pretty-printed JSON with decoded text.
pub fn render_json_export(entries: &[Entry]) -> serde_json::Result<String> {
    let items = entries
        .iter()
        .map(entry_to_export_item)
        .collect::<Vec<ExportEntry>>();
    serde_json::to_string_pretty(&items)
}

/// Render entries as a plain-text document, one block per entry.
#[must_use]
pub fn render_text_export(entries: &[Entry]) -> String {
    let separator = "-".repeat(TEXT_SEPARATOR_WIDTH);
    let mut output = String::new();

    for entry in entries {
        let _ = writeln!(output, "Date: {}", format_entry_date(entry.entry_date));
        let _ = writeln!(output, "Title: {}", entry.display_title());
        let _ = writeln!(output);
        let _ = writeln!(output, "Content:");
        let _ = writeln!(output, "{}", entry.content());
        let _ = writeln!(output);
        let _ = writeln!(output, "{separator}");
        let _ = writeln!(output);
    }

    output
}

/// Render entries in the selected format.
pub fn render_export(entries: &[Entry], format: ExportFormat) -> Result<ExportFile> {
    let contents = match format {
        ExportFormat::Json => render_json_export(entries)?,
        ExportFormat::Text => render_text_export(entries),
        ExportFormat::Pdf => return Err(Error::UnsupportedExportFormat("PDF".to_string())),
    };

    Ok(ExportFile {
        file_name: suggested_export_file_name(format),
        mime_type: format.mime_type(),
        contents,
    })
}

#[must_use]
pub fn suggested_export_file_name(format: ExportFormat) -> String {
    format!("diary_entries.{}", format.extension())
}

/// Short human date, e.g. `Jan 1, 2024`.
#[must_use]
pub fn format_entry_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::EntryId;

    fn entry(id: i64, title: &str, content: &str, day: u32) -> Entry {
        Entry {
            id: EntryId::new(id),
            encoded_title: title.to_string(),
            encoded_content: content.to_string(),
            entry_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            created_at: Some("2024-01-01 00:00:00".to_string()),
        }
    }

    #[test]
    fn json_export_contains_decoded_text() {
        let rendered = render_json_export(&[entry(1, "Day%201", "It%20rained", 1)]).unwrap();
        let parsed: Vec<ExportEntry> = serde_json::from_str(&rendered).unwrap();

        assert_eq!(
            parsed,
            vec![ExportEntry {
                id: 1,
                title: "Day 1".to_string(),
                content: "It rained".to_string(),
                entry_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            }]
        );
    }

    #[test]
    fn text_export_matches_block_layout() {
        let rendered = render_text_export(&[entry(1, "", "Line%20one%0Aline%20two", 5)]);
        let expected = format!(
            "Date: Jan 5, 2024\nTitle: Untitled\n\nContent:\nLine one\nline two\n\n{}\n\n",
            "-".repeat(50)
        );
        assert_eq!(rendered, expected);
    }

    #[test]
    fn pdf_export_fails_explicitly() {
        let error = render_export(&[], ExportFormat::Pdf).unwrap_err();
        assert!(matches!(error, Error::UnsupportedExportFormat(_)));
        assert_eq!(error.to_string(), "PDF export not implemented yet");
    }

    #[test]
    fn export_file_uses_format_metadata() {
        let file = render_export(&[], ExportFormat::Text).unwrap();
        assert_eq!(file.file_name, "diary_entries.txt");
        assert_eq!(file.mime_type, "text/plain");
        assert_eq!(file.contents, "");

        let file = render_export(&[], ExportFormat::Json).unwrap();
        assert_eq!(file.file_name, "diary_entries.json");
        assert_eq!(file.contents, "[]");
    }

    #[test]
    fn export_format_parses_aliases() {
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("txt".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert_eq!("pdf".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert!("docx".parse::<ExportFormat>().is_err());
    }
}
