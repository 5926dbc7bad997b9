//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Markdown blog server with live updates
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (searched upward from the current directory)
    #[arg(short = 'C', long, global = true, default_value = "folio.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Article directory (overrides `content.dir`)
    #[arg(short = 'd', long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub dir: Option<PathBuf>,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve articles over HTTP and push live edits to the browser
    #[command(visible_alias = "s")]
    Serve {
        #[command(flatten)]
        args: ServeArgs,
    },

    /// Print the article index as JSON
    #[command(visible_alias = "l")]
    List {
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Print one article as a rendered page
    Show {
        /// Article slug (file name without extension)
        slug: String,

        /// Print the JSON payload instead of the HTML page
        #[arg(long)]
        json: bool,
    },
}

/// Serve command arguments.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
    #[arg(short, long)]
    pub interface: Option<std::net::IpAddr>,

    /// Port number to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Watch the article directory and push changes
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub watch: Option<bool>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

impl Cli {
    pub fn serve_args(&self) -> Option<&ServeArgs> {
        match &self.command {
            Commands::Serve { args } => Some(args),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["folio", "serve", "-p", "8080", "-w", "false", "-V"]).unwrap();
        let args = cli.serve_args().unwrap();
        assert_eq!(args.port, Some(8080));
        assert_eq!(args.watch, Some(false));
        assert!(args.verbose);
        assert_eq!(cli.config, PathBuf::from("folio.toml"));
    }

    #[test]
    fn test_bare_watch_flag_means_true() {
        let cli = Cli::try_parse_from(["folio", "serve", "--watch"]).unwrap();
        assert_eq!(cli.serve_args().unwrap().watch, Some(true));
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from(["folio", "show", "hello", "--json", "-d", "posts"]).unwrap();
        assert_eq!(cli.dir, Some(PathBuf::from("posts")));
        match cli.command {
            Commands::Show { slug, json } => {
                assert_eq!(slug, "hello");
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_list_alias() {
        let cli = Cli::try_parse_from(["folio", "l", "--pretty"]).unwrap();
        assert!(matches!(cli.command, Commands::List { pretty: true }));
    }
}
