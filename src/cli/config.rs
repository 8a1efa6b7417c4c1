//! Configuration file support.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

/// Address `note serve` binds when nothing else is configured.
pub const DEFAULT_LISTEN: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 48374);

/// Application configuration loaded from config file.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Data directory of the local store
    pub dir: Option<PathBuf>,

    /// Editor command for writing notes
    pub editor: Option<String>,

    /// Note server URL; when set, commands use the remote backend
    pub remote: Option<String>,

    /// Bearer token for the note server, and for `note serve`
    pub token: Option<String>,

    /// Listen address for `note serve`
    pub listen: Option<SocketAddr>,
}

impl Config {
    /// Load configuration from the default config file location.
    ///
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("failed to read config file: {}", config_path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", config_path.display()))
    }

    /// Returns the configuration directory.
    ///
    /// Default: `~/.config/note`
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("note")
    }

    /// Returns the path to the config file.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Resolve the data directory, with CLI argument taking precedence.
    ///
    /// Precedence order:
    /// 1. CLI `--dir` argument
    /// 2. Config file `dir` setting
    /// 3. `~/.note`
    pub fn data_dir(&self, cli_dir: Option<&PathBuf>) -> Result<PathBuf> {
        if let Some(dir) = cli_dir.or(self.dir.as_ref()) {
            return Ok(dir.clone());
        }
        dirs::home_dir()
            .map(|home| home.join(".note"))
            .context("cannot determine home directory; pass --dir")
    }

    /// Resolve the server URL. CLI `--remote` wins over the config file.
    pub fn remote<'a>(&'a self, cli_remote: Option<&'a str>) -> Option<&'a str> {
        cli_remote.or(self.remote.as_deref())
    }

    /// Resolve the bearer token. CLI `--token` wins over the config file.
    pub fn token<'a>(&'a self, cli_token: Option<&'a str>) -> Option<&'a str> {
        cli_token.or(self.token.as_deref())
    }

    /// Resolve the listen address for `note serve`.
    pub fn listen(&self, cli_listen: Option<SocketAddr>) -> SocketAddr {
        cli_listen.or(self.listen).unwrap_or(DEFAULT_LISTEN)
    }

    /// Resolve the editor command.
    ///
    /// Precedence order:
    /// 1. Config file `editor` setting
    /// 2. $EDITOR environment variable
    /// 3. $VISUAL environment variable
    /// 4. "vi" as fallback
    pub fn editor(&self) -> String {
        self.editor
            .clone()
            .or_else(|| std::env::var("EDITOR").ok())
            .or_else(|| std::env::var("VISUAL").ok())
            .unwrap_or_else(|| "vi".to_string())
    }
}
