//! Editing note content in an external editor.

use anyhow::{Context, Result, bail};
use std::io::Write;
use std::process::Command;

use super::config::Config;

/// Produces new note content from the current content (allows mocking in tests).
pub trait EditorLauncher {
    fn edit(&self, initial: &[u8]) -> Result<Vec<u8>>;
}

/// Runs the configured editor on a temporary file.
pub struct SystemEditor {
    command: String,
}

impl SystemEditor {
    pub fn new(config: &Config) -> Self {
        Self {
            command: config.editor(),
        }
    }
}

impl EditorLauncher for SystemEditor {
    fn edit(&self, initial: &[u8]) -> Result<Vec<u8>> {
        // Parse editor command (may include args like "code --wait")
        let parts: Vec<&str> = self.command.split_whitespace().collect();
        let Some((cmd, args)) = parts.split_first() else {
            bail!("editor command is empty");
        };

        let mut file = tempfile::Builder::new()
            .prefix("note-")
            .suffix(".md")
            .tempfile()
            .context("failed to create temporary file for editing")?;
        file.write_all(initial)
            .and_then(|()| file.flush())
            .context("failed to write temporary file for editing")?;

        let status = Command::new(cmd)
            .args(args)
            .arg(file.path())
            .status()
            .with_context(|| format!("failed to launch editor '{}'", self.command))?;

        if !status.success() {
            bail!("editor '{}' exited with non-zero status", self.command);
        }

        std::fs::read(file.path())
            .with_context(|| format!("failed to read edited file: {}", file.path().display()))
    }
}
