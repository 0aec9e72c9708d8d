//! YAML store for services, search locations and settings.
//!
//! # Storage layout
//!
//! ```text
//! ~/.endevor/
//!   services/
//!     <service>.yaml     (one file per service, mode 0600)
//!   locations/
//!     <location>.yaml    (one file per search location, mode 0600)
//!   settings.yaml
//! ```
//!
//! # API pattern
//!
//! Every operation has two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! Tests must NEVER call the no-arg wrappers; always use `_at`.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::StoreError;
use crate::types::{
    EndevorConnection, EndevorId, EndevorSearchLocation, EndevorService, SearchLocation,
    Settings, Source,
};

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.endevor/`
pub fn store_dir_at(home: &Path) -> PathBuf {
    home.join(".endevor")
}

/// `<home>/.endevor/services/<name>.yaml`: pure, no I/O.
pub fn service_path_at(home: &Path, name: &str) -> PathBuf {
    store_dir_at(home)
        .join("services")
        .join(format!("{name}.yaml"))
}

/// `<home>/.endevor/locations/<name>.yaml`: pure, no I/O.
pub fn location_path_at(home: &Path, name: &str) -> PathBuf {
    store_dir_at(home)
        .join("locations")
        .join(format!("{name}.yaml"))
}

/// `<home>/.endevor/settings.yaml`
pub fn settings_path_at(home: &Path) -> PathBuf {
    store_dir_at(home).join("settings.yaml")
}

// ---------------------------------------------------------------------------
// 2. Services
// ---------------------------------------------------------------------------

/// Load a single service. Returns `StoreError::NotFound` if absent.
pub fn load_service_at(home: &Path, name: &str) -> Result<EndevorService, StoreError> {
    validate_name(name)?;
    let path = service_path_at(home, name);
    if !path.exists() {
        return Err(StoreError::NotFound {
            kind: "service",
            name: name.to_owned(),
        });
    }
    read_yaml(&path)
}

/// All stored services, sorted by name.
pub fn list_services_at(home: &Path) -> Result<Vec<EndevorService>, StoreError> {
    list_yaml(&store_dir_at(home).join("services"))
}

/// `list_services_at` convenience wrapper.
pub fn list_services() -> Result<Vec<EndevorService>, StoreError> {
    list_services_at(&home()?)
}

/// Atomically write a service to `services/<name>.yaml`.
pub fn save_service_at(home: &Path, service: &EndevorService) -> Result<(), StoreError> {
    validate_name(&service.id.name)?;
    let path = service_path_at(home, &service.id.name);
    write_yaml_atomic(&path, service)?;
    tracing::debug!(service = %service.id, path = %path.display(), "saved service");
    Ok(())
}

/// Register a service.
///
/// Idempotent: if the file already exists, loads and returns it unchanged.
pub fn add_service_at(
    home: &Path,
    id: EndevorId,
    connection: EndevorConnection,
) -> Result<EndevorService, StoreError> {
    validate_name(&id.name)?;
    if service_path_at(home, &id.name).exists() {
        return load_service_at(home, &id.name);
    }
    let now = Utc::now();
    let service = EndevorService {
        id,
        connection,
        search_locations: vec![],
        created_at: now,
        updated_at: now,
    };
    save_service_at(home, &service)?;
    Ok(service)
}

/// `add_service_at` convenience wrapper.
pub fn add_service(
    id: EndevorId,
    connection: EndevorConnection,
) -> Result<EndevorService, StoreError> {
    add_service_at(&home()?, id, connection)
}

// ---------------------------------------------------------------------------
// 3. Search locations
// ---------------------------------------------------------------------------

/// Load a single search location. Returns `StoreError::NotFound` if absent.
pub fn load_search_location_at(
    home: &Path,
    name: &str,
) -> Result<EndevorSearchLocation, StoreError> {
    validate_name(name)?;
    let path = location_path_at(home, name);
    if !path.exists() {
        return Err(StoreError::NotFound {
            kind: "search location",
            name: name.to_owned(),
        });
    }
    read_yaml(&path)
}

/// All stored search locations, sorted by name.
pub fn list_search_locations_at(home: &Path) -> Result<Vec<EndevorSearchLocation>, StoreError> {
    list_yaml(&store_dir_at(home).join("locations"))
}

/// `list_search_locations_at` convenience wrapper.
pub fn list_search_locations() -> Result<Vec<EndevorSearchLocation>, StoreError> {
    list_search_locations_at(&home()?)
}

/// Names of every stored search location, sorted.
pub fn search_location_names_at(home: &Path) -> Result<Vec<String>, StoreError> {
    Ok(list_search_locations_at(home)?
        .into_iter()
        .map(|location| location.id.name)
        .collect())
}

/// Create a new search location. Fails with `LocationExists` if the name is taken.
pub fn create_search_location_at(
    home: &Path,
    name: &str,
    location: SearchLocation,
) -> Result<EndevorSearchLocation, StoreError> {
    validate_name(name)?;
    if search_location_names_at(home)?.iter().any(|n| n == name) {
        return Err(StoreError::LocationExists {
            name: name.to_owned(),
        });
    }
    let now = Utc::now();
    let search_location = EndevorSearchLocation {
        id: EndevorId::internal(name),
        location,
        created_at: now,
        updated_at: now,
    };
    let path = location_path_at(home, name);
    write_yaml_atomic(&path, &search_location)?;
    tracing::debug!(location = name, path = %path.display(), "created search location");
    Ok(search_location)
}

/// Services that have the named location attached.
pub fn services_using_location_at(
    home: &Path,
    location: &str,
) -> Result<Vec<EndevorService>, StoreError> {
    Ok(list_services_at(home)?
        .into_iter()
        .filter(|service| service.uses_location(location))
        .collect())
}

// ---------------------------------------------------------------------------
// 4. Add a search location to a service
// ---------------------------------------------------------------------------

/// What the user picked when adding a location to a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationChoice {
    /// Create a brand-new location, then attach it.
    Create {
        name: String,
        location: SearchLocation,
    },
    /// Attach a location that already exists in the store.
    Existing(String),
}

/// How the location ended up attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddLocationOutcome {
    Created,
    /// The location was already used by `in_use_by` other services.
    UsedExistingLocation { in_use_by: usize },
    UnusedExistingLocation,
}

/// Result of [`add_search_location_at`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedLocation {
    pub service_id: EndevorId,
    pub search_location_id: EndevorId,
    pub outcome: AddLocationOutcome,
}

/// Attach a search location to a service.
///
/// When `service` is `None` and exactly one service is stored, that service is
/// used; otherwise the caller has to name one. Attaching is idempotent.
pub fn add_search_location_at(
    home: &Path,
    service: Option<&str>,
    choice: LocationChoice,
) -> Result<AddedLocation, StoreError> {
    let mut service = resolve_service_at(home, service)?;

    let (search_location_id, outcome) = match choice {
        LocationChoice::Create { name, location } => {
            let created = create_search_location_at(home, &name, location)?;
            (created.id, AddLocationOutcome::Created)
        }
        LocationChoice::Existing(name) => {
            let existing = load_search_location_at(home, &name)?;
            let in_use_by = services_using_location_at(home, &name)?
                .iter()
                .filter(|other| other.id != service.id)
                .count();
            let outcome = if in_use_by > 0 {
                AddLocationOutcome::UsedExistingLocation { in_use_by }
            } else {
                AddLocationOutcome::UnusedExistingLocation
            };
            (existing.id, outcome)
        }
    };

    if !service.uses_location(&search_location_id.name) {
        service
            .search_locations
            .push(search_location_id.name.clone());
        service.updated_at = Utc::now();
        if let Err(err) = save_service_at(home, &service) {
            // a location created here must not outlive the failed attach
            if outcome == AddLocationOutcome::Created {
                discard_search_location_at(home, &search_location_id.name);
            }
            return Err(err);
        }
    }
    tracing::info!(
        service = %service.id,
        location = %search_location_id,
        ?outcome,
        "search location added"
    );

    Ok(AddedLocation {
        service_id: service.id,
        search_location_id,
        outcome,
    })
}

/// `add_search_location_at` convenience wrapper.
pub fn add_search_location(
    service: Option<&str>,
    choice: LocationChoice,
) -> Result<AddedLocation, StoreError> {
    add_search_location_at(&home()?, service, choice)
}

fn discard_search_location_at(home: &Path, name: &str) {
    let path = location_path_at(home, name);
    if let Err(err) = std::fs::remove_file(&path) {
        tracing::warn!(
            location = name,
            path = %path.display(),
            error = %err,
            "could not remove search location after failed attach"
        );
    }
}

fn resolve_service_at(home: &Path, service: Option<&str>) -> Result<EndevorService, StoreError> {
    if let Some(name) = service {
        return load_service_at(home, name);
    }
    let mut services = list_services_at(home)?;
    if services.len() == 1 {
        if let Some(only) = services.pop() {
            return Ok(only);
        }
    }
    Err(StoreError::ServiceNotSpecified {
        available: services.into_iter().map(|s| s.id.name).collect(),
    })
}

// ---------------------------------------------------------------------------
// 5. Edit connection details
// ---------------------------------------------------------------------------

/// Where an edited connection was put.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionUpdate {
    /// Written to the service file.
    Stored(EndevorService),
    /// The service is owned elsewhere; the connection applies to this session only.
    Session(EndevorConnection),
}

/// Replace the connection details of an existing service.
pub fn edit_connection_at(
    home: &Path,
    service: &str,
    connection: EndevorConnection,
) -> Result<ConnectionUpdate, StoreError> {
    let mut stored = load_service_at(home, service)?;
    match stored.id.source {
        Source::Internal => {
            stored.connection = connection;
            stored.updated_at = Utc::now();
            save_service_at(home, &stored)?;
            tracing::info!(service = %stored.id, "connection details stored");
            Ok(ConnectionUpdate::Stored(stored))
        }
        Source::Synchronized => {
            tracing::info!(service = %stored.id, "connection details kept for this session");
            Ok(ConnectionUpdate::Session(connection))
        }
    }
}

/// `edit_connection_at` convenience wrapper.
pub fn edit_connection(
    service: &str,
    connection: EndevorConnection,
) -> Result<ConnectionUpdate, StoreError> {
    edit_connection_at(&home()?, service, connection)
}

// ---------------------------------------------------------------------------
// 6. Settings
// ---------------------------------------------------------------------------

/// Load settings, falling back to defaults when the file does not exist.
pub fn load_settings_at(home: &Path) -> Result<Settings, StoreError> {
    let path = settings_path_at(home);
    if !path.exists() {
        return Ok(Settings::default());
    }
    read_yaml(&path)
}

/// `load_settings_at` convenience wrapper.
pub fn load_settings() -> Result<Settings, StoreError> {
    load_settings_at(&home()?)
}

pub fn save_settings_at(home: &Path, settings: &Settings) -> Result<(), StoreError> {
    write_yaml_atomic(&settings_path_at(home), settings)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, StoreError> {
    dirs::home_dir().ok_or(StoreError::HomeNotFound)
}

fn validate_name(name: &str) -> Result<(), StoreError> {
    if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
        return Err(StoreError::InvalidName(name.to_owned()));
    }
    Ok(())
}

fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let contents = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&contents).map_err(|e| StoreError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Every `*.yaml` in `dir`, sorted by file name. A missing dir is empty.
fn list_yaml<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>, StoreError> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut entries: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter(|e| e.file_name().to_string_lossy().ends_with(".yaml"))
        .collect();
    entries.sort_by_key(|e| e.file_name());

    entries.iter().map(|entry| read_yaml(&entry.path())).collect()
}

/// Write flow: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
/// `.tmp` is always in the same directory as the target (same filesystem).
fn write_yaml_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(dir) = path.parent() {
        ensure_dir(dir)?;
    }
    let tmp_path = path.with_extension("yaml.tmp");
    let yaml = serde_yaml::to_string(value)?;
    std::fs::write(&tmp_path, yaml)?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

fn ensure_dir(dir: &Path) -> Result<(), StoreError> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
        set_dir_permissions(dir)?;
    }
    Ok(())
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
