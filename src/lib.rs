//! note - content-addressed personal notes, local or remote

pub mod backend;
pub mod cli;
pub mod domain;
pub mod infra;
pub mod server;

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::sync::Arc;

use backend::{Backend, LocalBackend, RemoteBackend, StoreLayout};
use cli::{
    Cli, Command,
    config::Config,
    handlers::{
        handle_add, handle_check, handle_completions, handle_delete, handle_edit, handle_list,
        handle_search, handle_serve, handle_view,
    },
};

/// Main entry point for the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    cli::logging::init(cli.verbose);

    let config = Config::load()?;

    match &cli.command {
        Command::Add(args) => handle_add(args, &*open_backend(&cli, &config)?, &config),
        Command::List(args) => handle_list(args, &*open_backend(&cli, &config)?),
        Command::View(args) => handle_view(args, &*open_backend(&cli, &config)?),
        Command::Search(args) => handle_search(args, &*open_backend(&cli, &config)?),
        Command::Edit(args) => handle_edit(args, &*open_backend(&cli, &config)?, &config),
        Command::Delete(args) => handle_delete(args, &*open_backend(&cli, &config)?),
        Command::Check => handle_check(&open_local(&cli, &config)?),
        Command::Serve(args) => {
            let token = config
                .token(cli.token.as_deref())
                .context("serve needs a token: pass --token or set `token` in the config file")?;
            let backend: Arc<dyn Backend> = Arc::new(open_local(&cli, &config)?);
            handle_serve(backend, token, config.listen(args.listen))
        }
        Command::Completions(args) => handle_completions(args),
    }
}

/// Opens the local store and creates its directories.
fn open_local(cli: &Cli, config: &Config) -> Result<LocalBackend> {
    let data_dir = config.data_dir(cli.dir.as_ref())?;
    let backend = LocalBackend::new(StoreLayout::new(Config::config_dir(), data_dir));
    backend.init().with_context(|| {
        format!(
            "failed to initialize store at {}",
            backend.layout().data_dir().display()
        )
    })?;
    tracing::debug!(dir = %backend.layout().data_dir().display(), "using local store");
    Ok(backend)
}

/// Opens the remote backend when a server URL is configured, else the local store.
fn open_backend(cli: &Cli, config: &Config) -> Result<Box<dyn Backend>> {
    let Some(url) = config.remote(cli.remote.as_deref()) else {
        return Ok(Box::new(open_local(cli, config)?));
    };
    let Some(token) = config.token(cli.token.as_deref()) else {
        bail!("remote '{}' needs a token: pass --token or set `token` in the config file", url);
    };

    let backend = RemoteBackend::new(url, token)?;
    backend.init()?;
    tracing::debug!(%url, "using remote backend");
    Ok(Box::new(backend))
}
