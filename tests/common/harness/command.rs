//! Builder for invocations of the `note` binary.

// Allow dead code since each test binary uses a different subset
#![allow(dead_code)]

use assert_cmd::Command;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Arguments, environment and stdin for one `note` run. Nothing executes
/// until [`NoteCommand::assert`].
pub struct NoteCommand {
    args: Vec<String>,
    envs: Vec<(String, String)>,
    stdin: Option<Vec<u8>>,
}

impl NoteCommand {
    pub fn new() -> Self {
        Self {
            args: Vec::new(),
            envs: Vec::new(),
            stdin: None,
        }
    }

    /// Points the run at a data directory.
    pub fn dir(mut self, path: &Path) -> Self {
        self.args.push("--dir".to_string());
        self.args.push(path.to_string_lossy().to_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args
            .extend(args.into_iter().map(|s| s.as_ref().to_string()));
        self
    }

    /// Sets an environment variable for the child process.
    pub fn env(mut self, key: &str, value: impl AsRef<str>) -> Self {
        self.envs.push((key.to_string(), value.as_ref().to_string()));
        self
    }

    /// Pipes `input` to the command's stdin.
    pub fn stdin(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// Runs the binary with `RUST_LOG` cleared so log lines never reach
    /// asserted output.
    #[allow(deprecated)]
    pub fn assert(self) -> assert_cmd::assert::Assert {
        let mut cmd = Command::cargo_bin("note").expect("Failed to find note binary");
        cmd.args(&self.args);
        cmd.env_remove("RUST_LOG");
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }
        if let Some(input) = self.stdin {
            cmd.write_stdin(input);
        }
        cmd.assert()
    }

    /// Stdout of a successful run.
    pub fn output_success(self) -> String {
        let output = self.assert().success().get_output().stdout.clone();
        String::from_utf8(output).expect("Output was not valid UTF-8")
    }

    /// Stdout of a successful run, parsed as JSON.
    pub fn output_json<T: DeserializeOwned>(self) -> T {
        let output = self.output_success();
        serde_json::from_str(&output).expect("Failed to parse output as JSON")
    }

    // Subcommands

    /// `add <name>` reading `content` from stdin.
    pub fn add(self, name: &str, content: &str) -> Self {
        self.args(["add", name]).stdin(content)
    }

    pub fn ls(self) -> Self {
        self.args(["ls"])
    }

    pub fn view(self, name: &str) -> Self {
        self.args(["view", name])
    }

    pub fn search(self, query: &str) -> Self {
        self.args(["search", query])
    }

    pub fn edit(self, name: &str) -> Self {
        self.args(["edit", name])
    }

    pub fn rm(self, name: &str) -> Self {
        self.args(["rm", name])
    }

    pub fn check(self) -> Self {
        self.args(["check"])
    }

    pub fn format_json(self) -> Self {
        self.args(["--format", "json"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_runs_without_a_store() {
        NoteCommand::new().args(["--help"]).assert().success();
    }
}
