//! `endevor service add|list|edit`

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tabled::{settings::Style, Table, Tabled};

use endevor_core::{
    store::{self, ConnectionUpdate},
    EndevorConnection, EndevorId, ServiceLocation,
};

use super::super::SourceArg;

/// Manage Endevor service connections.
#[derive(Subcommand, Debug)]
pub enum ServiceCommand {
    /// Register a service connection.
    Add(AddArgs),

    /// List registered services.
    List {
        /// Emit machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Replace the connection details of a service.
    Edit(EditArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Service name.
    pub name: String,

    /// Web service URL, e.g. https://host:9443/EndevorService/api/v2
    pub url: String,

    /// Reject untrusted TLS certificates.
    #[arg(long)]
    pub reject_unauthorized: bool,

    /// Owner of the definition: internal | synchronized. Defaults to internal.
    #[arg(long)]
    pub source: Option<SourceArg>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Service name.
    pub name: String,

    /// New web service URL.
    pub url: String,

    /// Reject untrusted TLS certificates.
    #[arg(long)]
    pub reject_unauthorized: bool,
}

#[derive(Tabled)]
struct ServiceRow {
    #[tabled(rename = "service")]
    name: String,
    #[tabled(rename = "source")]
    source: String,
    #[tabled(rename = "url")]
    url: String,
    #[tabled(rename = "locations")]
    locations: String,
}

pub fn run(cmd: ServiceCommand) -> Result<()> {
    match cmd {
        ServiceCommand::Add(args) => add(args),
        ServiceCommand::List { json } => list(json),
        ServiceCommand::Edit(args) => edit(args),
    }
}

fn connection_from(url: &str, reject_unauthorized: bool) -> Result<EndevorConnection> {
    Ok(EndevorConnection {
        location: ServiceLocation::from_service_url(url)?,
        reject_unauthorized,
    })
}

fn add(args: AddArgs) -> Result<()> {
    let connection = connection_from(&args.url, args.reject_unauthorized)?;
    let source = args.source.unwrap_or_default().into();
    let service = store::add_service(EndevorId::new(args.name.clone(), source), connection)
        .with_context(|| format!("failed to add service '{}'", args.name))?;

    println!(
        "✓ Service '{}' → {}",
        service.id,
        service.connection.location.to_service_url()
    );
    Ok(())
}

fn list(json: bool) -> Result<()> {
    let services = store::list_services().context("failed to read services")?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&services).context("failed to serialize services")?
        );
        return Ok(());
    }

    if services.is_empty() {
        println!("No services registered.");
        println!("Run: endevor service add <name> <url>");
        return Ok(());
    }

    let rows: Vec<ServiceRow> = services
        .into_iter()
        .map(|service| ServiceRow {
            name: service.id.name,
            source: service.id.source.to_string(),
            url: service.connection.location.to_service_url(),
            locations: service.search_locations.join(", "),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

fn edit(args: EditArgs) -> Result<()> {
    let connection = connection_from(&args.url, args.reject_unauthorized)?;
    let update = store::edit_connection(&args.name, connection)
        .with_context(|| format!("failed to edit service '{}'", args.name))?;

    match update {
        ConnectionUpdate::Stored(service) => println!(
            "✓ Updated connection details of '{}' are stored: {}",
            service.id,
            service.connection.location.to_service_url()
        ),
        ConnectionUpdate::Session(connection) => println!(
            "✓ '{}' is synchronized from another source; {} applies to this session only",
            args.name,
            connection.location.to_service_url()
        ),
    }
    Ok(())
}
