//! Endevor: workspace tooling for the Endevor source control system.
//!
//! # Usage
//!
//! ```text
//! endevor service add <name> <url> [--reject-unauthorized] [--source internal|synchronized]
//! endevor service list [--json]
//! endevor service edit <name> <url> [--reject-unauthorized]
//! endevor location create <name> --env <env> --stage <n> [--system ..] [--service <name>]
//! endevor location add <name> [--service <name>]
//! endevor location list [--json]
//! endevor sync classify <file|-> [--plain] [--json]
//! endevor sync run [--timeout <secs>] [--plain] [--json] -- <program> [args...]
//! endevor report uri <service> <location> <object> <report-id>
//! endevor report parse <uri>
//! ```

mod commands;

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    location::LocationCommand, report::ReportCommand, service::ServiceCommand, sync::SyncCommand,
};
use endevor_core::Source;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "endevor",
    version,
    about = "Configure Endevor services and reconcile workspace syncs",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage Endevor service connections.
    Service {
        #[command(subcommand)]
        command: ServiceCommand,
    },

    /// Manage search (inventory) locations.
    Location {
        #[command(subcommand)]
        command: LocationCommand,
    },

    /// Classify the result of a workspace sync.
    Sync {
        #[command(subcommand)]
        command: SyncCommand,
    },

    /// Build or decode generic action report URIs.
    Report {
        #[command(subcommand)]
        command: ReportCommand,
    },
}

// ---------------------------------------------------------------------------
// Shared Source argument: parsed from CLI strings, converts to core type
// ---------------------------------------------------------------------------

/// Thin wrapper so clap can parse `Source` from CLI args.
#[derive(Debug, Clone, Default)]
pub struct SourceArg(pub Source);

impl FromStr for SourceArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "internal" => Ok(Self(Source::Internal)),
            "synchronized" => Ok(Self(Source::Synchronized)),
            other => Err(format!(
                "unknown source '{other}'; expected: internal, synchronized"
            )),
        }
    }
}

impl fmt::Display for SourceArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<SourceArg> for Source {
    fn from(s: SourceArg) -> Self {
        s.0
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Service { command } => commands::service::run(command),
        Commands::Location { command } => commands::location::run(command),
        Commands::Sync { command } => commands::sync::run(command),
        Commands::Report { command } => commands::report::run(command),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
