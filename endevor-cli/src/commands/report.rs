//! `endevor report uri|parse`: generic action report URIs.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use endevor_core::{report_uri, EndevorId};

use super::super::SourceArg;

/// Build or decode generic action report URIs.
#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    /// Print the read-only URI of a report.
    Uri(UriArgs),

    /// Decode a report URI back into its parts.
    Parse {
        /// URI printed by `endevor report uri`.
        uri: String,
    },
}

#[derive(Args, Debug)]
pub struct UriArgs {
    pub service: String,
    pub location: String,
    /// Element or package the report belongs to.
    pub object: String,
    pub report_id: String,

    /// Owner of the service: internal | synchronized.
    #[arg(long)]
    pub service_source: Option<SourceArg>,

    /// Owner of the location: internal | synchronized.
    #[arg(long)]
    pub location_source: Option<SourceArg>,
}

pub fn run(cmd: ReportCommand) -> Result<()> {
    match cmd {
        ReportCommand::Uri(args) => uri(args),
        ReportCommand::Parse { uri } => parse(&uri),
    }
}

fn uri(args: UriArgs) -> Result<()> {
    let service_id = EndevorId::new(args.service, args.service_source.unwrap_or_default().into());
    let location_id =
        EndevorId::new(args.location, args.location_source.unwrap_or_default().into());
    let uri =
        report_uri::to_generic_report_uri(&service_id, &location_id, &args.object, &args.report_id)
            .context("failed to build report URI")?;
    println!("{uri}");
    Ok(())
}

fn parse(uri: &str) -> Result<()> {
    let query = report_uri::parse_generic_report_uri(uri).context("failed to decode report URI")?;
    println!(
        "{}",
        serde_json::to_string_pretty(&query).context("failed to serialize report query")?
    );
    Ok(())
}
