//! List and search command handlers.

use anyhow::{Context, Result};

use crate::backend::Backend;
use crate::cli::output::print_notes;
use crate::cli::{ListArgs, SearchArgs};

pub fn handle_list(args: &ListArgs, backend: &dyn Backend) -> Result<()> {
    let filter = args.filter.as_deref().unwrap_or("");
    let notes = backend.list(filter).context("failed to list notes")?;
    print_notes(&notes, args.format, "No notes found.")
}

pub fn handle_search(args: &SearchArgs, backend: &dyn Backend) -> Result<()> {
    let notes = backend
        .search(&args.query)
        .with_context(|| format!("failed to search for '{}'", args.query))?;
    print_notes(&notes, args.format, "No matching notes.")
}
