//! View and Edit command handlers.

use anyhow::{Context, Result, bail};
use std::io::{self, Write};

use crate::backend::{Backend, BackendError};
use crate::cli::config::Config;
use crate::cli::editor::{EditorLauncher, SystemEditor};
use crate::cli::{EditArgs, ViewArgs};

/// Prints the note content as stored. A failed integrity check is fatal here.
pub fn handle_view(args: &ViewArgs, backend: &dyn Backend) -> Result<()> {
    let note = backend
        .get(&args.name)
        .with_context(|| format!("failed to read note '{}'", args.name))?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(note.data().unwrap_or_default())?;
    stdout.flush()?;
    Ok(())
}

/// Internal implementation that accepts a generic editor launcher.
pub(crate) fn handle_edit_impl<E: EditorLauncher>(
    args: &EditArgs,
    backend: &dyn Backend,
    editor: &E,
) -> Result<()> {
    let note = backend
        .get(&args.name)
        .with_context(|| format!("failed to read note '{}'", args.name))?;

    let edited = editor.edit(note.data().unwrap_or_default())?;
    if edited.is_empty() {
        bail!("edited note is empty, keeping '{}' unchanged", args.name);
    }

    match backend.update(note.name(), &edited) {
        Ok(()) => println!("Updated: {}", note.name()),
        Err(BackendError::NotModified(_)) => println!("Not modified"),
        Err(e) => return Err(e).with_context(|| format!("failed to update note '{}'", args.name)),
    }
    Ok(())
}

pub fn handle_edit(args: &EditArgs, backend: &dyn Backend, config: &Config) -> Result<()> {
    handle_edit_impl(args, backend, &SystemEditor::new(config))
}
