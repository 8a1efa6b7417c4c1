//! Isolated test environment with temp directory.

// Allow dead code since each test binary uses a different subset
#![allow(dead_code)]

use super::NoteCommand;
use note::backend::{LocalBackend, StoreLayout};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated test environment.
///
/// The data directory, home and config directories all live in one temp
/// directory that is removed on drop, so commands never touch the real
/// user's notes or configuration.
pub struct TestEnv {
    /// The temporary directory (kept for lifetime management)
    _temp_dir: TempDir,
    root: PathBuf,
}

impl TestEnv {
    /// Creates a new isolated test environment.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().to_path_buf();
        for sub in ["home", "config"] {
            std::fs::create_dir_all(root.join(sub)).expect("Failed to create directory");
        }
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    /// Returns the data directory passed as `--dir`.
    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    /// Returns the directory used as `$XDG_CONFIG_HOME`.
    pub fn config_home(&self) -> PathBuf {
        self.root.join("config")
    }

    /// Returns the path of the index file.
    pub fn index_path(&self) -> PathBuf {
        self.data_dir().join("index")
    }

    /// Opens the environment's store directly, for inspecting state.
    pub fn backend(&self) -> LocalBackend {
        LocalBackend::new(StoreLayout::new(
            self.config_home().join("note"),
            self.data_dir(),
        ))
    }

    /// Creates a NoteCommand configured for this test environment.
    pub fn cmd(&self) -> NoteCommand {
        NoteCommand::new()
            .dir(&self.data_dir())
            .env("HOME", self.root.join("home").to_string_lossy())
            .env("XDG_CONFIG_HOME", self.config_home().to_string_lossy())
            .env("EDITOR", "false")
    }

    /// Writes a file relative to the environment root and returns its path.
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Writes an executable editor script that replaces the edited file with
    /// `content`.
    #[cfg(unix)]
    pub fn editor_script(&self, content: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let source = self.write_file("new-content", content);
        let script = self.write_file(
            "editor.sh",
            &format!("#!/bin/sh\ncat '{}' > \"$1\"\n", source.display()),
        );
        let mut perms = std::fs::metadata(&script).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&script, perms).unwrap();
        script
    }

    /// Returns the path of a blob for `id` inside the data directory.
    pub fn blob_path(&self, id: &str) -> PathBuf {
        self.data_dir().join(&id[..2]).join(&id[2..])
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
