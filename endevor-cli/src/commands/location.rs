//! `endevor location create|add|list`

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use endevor_core::{
    store::{self, AddLocationOutcome, AddedLocation, LocationChoice},
    EndevorSearchLocation, EndevorService, SearchLocation,
};

/// Manage search (inventory) locations.
#[derive(Subcommand, Debug)]
pub enum LocationCommand {
    /// Create a new search location and add it to a service.
    Create(CreateArgs),

    /// Add an existing search location to a service.
    Add(AddArgs),

    /// List search locations and the services using them.
    List {
        /// Emit machine-readable JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Location name.
    pub name: String,

    /// Endevor environment.
    #[arg(long = "env")]
    pub environment: String,

    /// Stage number (1 or 2).
    #[arg(long)]
    pub stage: String,

    #[arg(long)]
    pub system: Option<String>,

    #[arg(long)]
    pub subsystem: Option<String>,

    /// Element type filter.
    #[arg(long = "type", value_name = "TYPE")]
    pub element_type: Option<String>,

    /// Default CCID for actions run through this location.
    #[arg(long)]
    pub ccid: Option<String>,

    /// Default comment for actions run through this location.
    #[arg(long)]
    pub comment: Option<String>,

    /// Service to add the location to.
    /// If omitted and only one service exists, that service is used automatically.
    #[arg(long, short = 's')]
    pub service: Option<String>,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Existing location name.
    pub name: String,

    /// Service to add the location to.
    /// If omitted and only one service exists, that service is used automatically.
    #[arg(long, short = 's')]
    pub service: Option<String>,
}

#[derive(Serialize)]
struct LocationJson {
    name: String,
    location: SearchLocation,
    services: Vec<String>,
}

#[derive(Tabled)]
struct LocationRow {
    #[tabled(rename = "location")]
    name: String,
    #[tabled(rename = "env/stage/system/subsystem/type")]
    path: String,
    #[tabled(rename = "used by")]
    services: String,
}

pub fn run(cmd: LocationCommand) -> Result<()> {
    match cmd {
        LocationCommand::Create(args) => create(args),
        LocationCommand::Add(args) => add(args),
        LocationCommand::List { json } => list(json),
    }
}

fn create(args: CreateArgs) -> Result<()> {
    let location = SearchLocation {
        environment: args.environment,
        stage_number: args.stage,
        system: args.system,
        subsystem: args.subsystem,
        element_type: args.element_type,
        ccid: args.ccid,
        comment: args.comment,
    };
    let added = store::add_search_location(
        args.service.as_deref(),
        LocationChoice::Create {
            name: args.name.clone(),
            location,
        },
    )
    .with_context(|| format!("failed to create search location '{}'", args.name))?;

    print_added(&added);
    Ok(())
}

fn add(args: AddArgs) -> Result<()> {
    let added = store::add_search_location(
        args.service.as_deref(),
        LocationChoice::Existing(args.name.clone()),
    )
    .with_context(|| format!("failed to add search location '{}'", args.name))?;

    print_added(&added);
    Ok(())
}

fn print_added(added: &AddedLocation) {
    let note = match added.outcome {
        AddLocationOutcome::Created => "new location".to_string(),
        AddLocationOutcome::UsedExistingLocation { in_use_by } => {
            format!("also used by {in_use_by} other service(s)")
        }
        AddLocationOutcome::UnusedExistingLocation => "existing location".to_string(),
    };
    println!(
        "✓ Added '{}' to service '{}' ({note})",
        added.search_location_id, added.service_id
    );
}

fn list(json: bool) -> Result<()> {
    let locations = store::list_search_locations().context("failed to read search locations")?;
    let services = store::list_services().context("failed to read services")?;

    if json {
        let payload: Vec<LocationJson> = locations
            .into_iter()
            .map(|location| LocationJson {
                services: users_of(&location, &services),
                name: location.id.name,
                location: location.location,
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).context("failed to serialize locations")?
        );
        return Ok(());
    }

    if locations.is_empty() {
        println!("No search locations defined.");
        println!("Run: endevor location create <name> --env <env> --stage <n>");
        return Ok(());
    }

    let rows: Vec<LocationRow> = locations
        .iter()
        .map(|location| LocationRow {
            name: location.id.name.clone(),
            path: location.location.to_string(),
            services: users_of(location, &services).join(", "),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

fn users_of(location: &EndevorSearchLocation, services: &[EndevorService]) -> Vec<String> {
    services
        .iter()
        .filter(|service| service.uses_location(&location.id.name))
        .map(|service| service.id.name.clone())
        .collect()
}
