//! Delete command handler.

use anyhow::{Context, Result};

use crate::backend::{Backend, BackendError};
use crate::cli::DeleteArgs;

/// Deletes a note. Notes whose content fails verification can still be removed.
pub fn handle_delete(args: &DeleteArgs, backend: &dyn Backend) -> Result<()> {
    let note = backend
        .get(&args.name)
        .or_else(|e| {
            if matches!(e, BackendError::IntegrityFail(_)) {
                tracing::warn!(name = %args.name, "deleting note that failed integrity check");
            }
            e.recover_note()
        })
        .with_context(|| format!("failed to find note '{}'", args.name))?;

    backend
        .delete(&note)
        .with_context(|| format!("failed to delete note '{}'", args.name))?;

    println!("Deleted: {}", note.name());
    Ok(())
}
