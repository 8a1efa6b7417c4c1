//! CLI command definitions and handlers

pub mod config;
pub mod editor;
pub mod handlers;
pub mod logging;
pub mod output;

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;
use std::net::SocketAddr;
use std::path::PathBuf;

use output::OutputFormat;

/// note - content-addressed personal notes, local or remote
#[derive(Parser, Debug)]
#[command(name = "note", version, about, long_about = None)]
pub struct Cli {
    /// Data directory of the local store (overrides config file)
    #[arg(short = 'd', long, global = true)]
    pub dir: Option<PathBuf>,

    /// URL of a note server to use instead of the local store
    #[arg(short = 'r', long, global = true)]
    pub remote: Option<String>,

    /// Bearer token for the note server
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a note from stdin or your editor
    Add(AddArgs),

    /// List notes, optionally filtered by name
    #[command(name = "ls")]
    List(ListArgs),

    /// Print a note's contents
    View(ViewArgs),

    /// Search note contents (case-insensitive)
    Search(SearchArgs),

    /// Edit a note in your editor
    Edit(EditArgs),

    /// Delete a note
    #[command(name = "rm")]
    Delete(DeleteArgs),

    /// Check the local store for missing, corrupt or orphaned content
    Check,

    /// Serve the local store over HTTP
    Serve(ServeArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `add` command
#[derive(Parser, Debug)]
pub struct AddArgs {
    /// Name of the new note
    pub name: String,
}

/// Arguments for the `ls` (list) command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Only list notes whose name contains this text
    pub filter: Option<String>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `view` command
#[derive(Parser, Debug)]
pub struct ViewArgs {
    /// Note name
    pub name: String,
}

/// Arguments for the `search` command
#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// Text to look for
    pub query: String,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `edit` command
#[derive(Parser, Debug)]
pub struct EditArgs {
    /// Note name
    pub name: String,
}

/// Arguments for the `rm` command
#[derive(Parser, Debug)]
pub struct DeleteArgs {
    /// Note name
    pub name: String,
}

/// Arguments for the `serve` command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to listen on (default 127.0.0.1:48374)
    #[arg(short, long)]
    pub listen: Option<SocketAddr>,
}

/// Arguments for the `completions` command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for (bash, zsh, fish)
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_options_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "note",
            "ls",
            "--remote",
            "https://notes.example.com",
            "--token",
            "t",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.remote.as_deref(), Some("https://notes.example.com"));
        assert_eq!(cli.token.as_deref(), Some("t"));
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::List(ListArgs { filter: None, .. })));
    }

    #[test]
    fn rm_and_ls_use_short_names() {
        let cli = Cli::try_parse_from(["note", "rm", "todo"]).unwrap();
        assert!(matches!(cli.command, Command::Delete(DeleteArgs { name }) if name == "todo"));

        let cli = Cli::try_parse_from(["note", "ls", "to", "--format", "json"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::List(ListArgs { filter: Some(f), format: OutputFormat::Json }) if f == "to"
        ));
    }

    #[test]
    fn serve_parses_listen_address() {
        let cli = Cli::try_parse_from(["note", "serve", "--listen", "0.0.0.0:9000"]).unwrap();
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.listen, Some("0.0.0.0:9000".parse().unwrap()));
    }
}
