//! Output formats and tables for CLI commands.

use clap::ValueEnum;
use serde::Serialize;

use crate::domain::Note;

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table (default)
    #[default]
    Human,
    /// JSON output for programmatic consumption
    Json,
}

/// Wrapper for serializable command output.
#[derive(Debug, Serialize)]
pub struct Output<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> Output<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

const NAME_WIDTH: usize = 40;

/// Renders notes as a NAME/DATE table.
pub fn note_table(notes: &[Note]) -> String {
    let mut out = format!("{:<width$}  {}\n", "NAME", "DATE", width = NAME_WIDTH);
    for note in notes {
        out.push_str(&format!(
            "{:<width$}  {}\n",
            truncate_str(note.name(), NAME_WIDTH),
            note.date().format("%Y-%m-%d %H:%M"),
            width = NAME_WIDTH
        ));
    }
    out
}

/// Prints notes in the requested format; `empty` is shown for no results.
pub fn print_notes(notes: &[Note], format: OutputFormat, empty: &str) -> anyhow::Result<()> {
    match format {
        OutputFormat::Human if notes.is_empty() => println!("{}", empty),
        OutputFormat::Human => {
            print!("{}", note_table(notes));
            println!();
            println!("{} note(s)", notes.len());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&Output::new(notes))?);
        }
    }
    Ok(())
}

/// Truncates a string to a maximum display width, adding ellipsis if needed.
pub(crate) fn truncate_str(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    #[test]
    fn table_lists_name_and_date() {
        let date = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let notes = vec![Note::with_date("todo", "buy milk", date).unwrap()];

        let table = note_table(&notes);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("NAME"));
        assert!(lines[0].ends_with("DATE"));
        assert!(lines[1].starts_with("todo "));
        assert!(lines[1].ends_with("2024-01-15 10:30"));
    }

    #[test]
    fn truncate_str_short_unchanged() {
        assert_eq!(truncate_str("todo", 10), "todo");
    }

    #[test]
    fn truncate_str_long_gets_ellipsis() {
        assert_eq!(truncate_str("abcdefghij", 5), "abcd…");
    }
}
