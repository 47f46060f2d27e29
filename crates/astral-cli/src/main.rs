//! The `astral` command-line tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

/// Output format selection, shared by every command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Parser)]
#[command(name = "astral", version, about = "Work with Astral graph snapshots")]
struct Cli {
    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Suppress non-error output.
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import a GraphML, GML, or Pajek file.
    Import {
        /// File to import.
        file: PathBuf,
        /// Snapshot to merge into; created when it does not exist yet.
        #[arg(long)]
        into: Option<PathBuf>,
    },
    /// Show counts and schema details of a snapshot.
    Stats {
        /// Snapshot to inspect.
        snapshot: PathBuf,
    },
    /// List the available plugins and their parameters.
    Plugins,
    /// Run an analytic plugin over a snapshot and save the result.
    Run {
        /// Plugin name, e.g. similarity.jaccard. See `astral plugins`.
        algorithm: String,
        /// Snapshot to operate on.
        snapshot: PathBuf,
        /// Parameter override as NAME=VALUE. May be repeated.
        #[arg(long = "param", value_name = "NAME=VALUE")]
        params: Vec<String>,
    },
    /// Search attribute values.
    Find {
        /// Snapshot to search.
        snapshot: PathBuf,
        /// Text or pattern to look for.
        text: String,
        /// Treat the text as a regular expression.
        #[arg(long)]
        regex: bool,
        /// Match regardless of case.
        #[arg(long)]
        ignore_case: bool,
        /// Attribute to search; every string attribute when omitted.
        #[arg(long)]
        attribute: Option<String>,
        /// Search transactions instead of vertices.
        #[arg(long)]
        transactions: bool,
    },
    /// Show the plugin run history of a snapshot session.
    Report {
        /// Snapshot to report on.
        snapshot: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Import { file, into } => {
            commands::import::run(&file, into.as_deref(), cli.format, cli.quiet)
        }
        Command::Stats { snapshot } => commands::stats::run(&snapshot, cli.format, cli.quiet),
        Command::Plugins => commands::plugins::run(cli.format, cli.quiet),
        Command::Run {
            algorithm,
            snapshot,
            params,
        } => commands::run::run(&algorithm, &snapshot, &params, cli.format, cli.quiet),
        Command::Find {
            snapshot,
            text,
            regex,
            ignore_case,
            attribute,
            transactions,
        } => commands::find::run(
            &snapshot,
            &text,
            attribute.as_deref(),
            regex,
            ignore_case,
            transactions,
            cli.format,
            cli.quiet,
        ),
        Command::Report { snapshot } => commands::report::run(&snapshot, cli.format, cli.quiet),
    };

    if let Err(e) = result {
        output::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}
