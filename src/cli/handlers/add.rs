//! Add command handler.

use anyhow::{Context, Result, bail};
use std::io::{self, IsTerminal, Read};

use crate::backend::Backend;
use crate::cli::AddArgs;
use crate::cli::config::Config;
use crate::cli::editor::{EditorLauncher, SystemEditor};
use crate::domain::Note;

pub fn handle_add(args: &AddArgs, backend: &dyn Backend, config: &Config) -> Result<()> {
    let stdin = io::stdin();
    let piped = if stdin.is_terminal() {
        None
    } else {
        let mut buf = Vec::new();
        stdin
            .lock()
            .read_to_end(&mut buf)
            .context("failed to read note from stdin")?;
        Some(buf)
    };
    handle_add_impl(args, backend, piped, &SystemEditor::new(config))
}

/// Creates the note from piped content, or from the editor when nothing was piped.
pub(crate) fn handle_add_impl<E: EditorLauncher>(
    args: &AddArgs,
    backend: &dyn Backend,
    piped: Option<Vec<u8>>,
    editor: &E,
) -> Result<()> {
    let data = match piped {
        Some(data) => data,
        None => editor.edit(b"")?,
    };
    if data.is_empty() {
        bail!("note is empty, nothing to add");
    }

    let note = Note::new(args.name.as_str(), data)?;
    backend
        .create(&note)
        .with_context(|| format!("failed to add note '{}'", args.name))?;

    println!("Added: {}", note.name());
    Ok(())
}
