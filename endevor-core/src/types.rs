//! Domain types for Endevor services, search locations and elements.
//!
//! All types are serializable/deserializable via serde; the store persists
//! services, search locations and settings as YAML.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::StoreError;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Which side owns a service or search location definition.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Source {
    /// Stored by this tool under `~/.endevor/`.
    #[default]
    Internal,
    /// Owned by an external profile manager; edits only live for the session.
    Synchronized,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Internal => write!(f, "internal"),
            Source::Synchronized => write!(f, "synchronized"),
        }
    }
}

/// Identifier of a service or a search location: a name plus its owner.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EndevorId {
    pub name: String,
    pub source: Source,
}

impl EndevorId {
    pub fn new(name: impl Into<String>, source: Source) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }

    /// Shorthand for an id owned by the local store.
    pub fn internal(name: impl Into<String>) -> Self {
        Self::new(name, Source::Internal)
    }
}

impl fmt::Display for EndevorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Connections
// ---------------------------------------------------------------------------

/// Transport protocol of an Endevor web service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ServiceProtocol {
    Http,
    #[default]
    Https,
}

impl ServiceProtocol {
    pub fn default_port(self) -> u16 {
        match self {
            ServiceProtocol::Http => 80,
            ServiceProtocol::Https => 443,
        }
    }
}

impl fmt::Display for ServiceProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceProtocol::Http => write!(f, "http"),
            ServiceProtocol::Https => write!(f, "https"),
        }
    }
}

/// Network location of an Endevor web service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLocation {
    pub protocol: ServiceProtocol,
    pub hostname: String,
    pub port: u16,
    /// Path prefix of the web service, e.g. `/EndevorService/api/v2`.
    /// Empty when the service is mounted at the root.
    #[serde(default)]
    pub base_path: String,
}

impl ServiceLocation {
    /// Render as `protocol://hostname:port/basePath`.
    pub fn to_service_url(&self) -> String {
        let base = self.base_path.trim_matches('/');
        if base.is_empty() {
            format!("{}://{}:{}", self.protocol, self.hostname, self.port)
        } else {
            format!("{}://{}:{}/{}", self.protocol, self.hostname, self.port, base)
        }
    }

    /// Parse a service URL typed by the user.
    ///
    /// Only `http` and `https` are accepted. A missing port falls back to the
    /// protocol default.
    pub fn from_service_url(input: &str) -> Result<Self, StoreError> {
        let invalid = |reason: String| StoreError::InvalidServiceUrl {
            url: input.to_owned(),
            reason,
        };
        let url = Url::parse(input.trim()).map_err(|e| invalid(e.to_string()))?;
        let protocol = match url.scheme() {
            "http" => ServiceProtocol::Http,
            "https" => ServiceProtocol::Https,
            other => return Err(invalid(format!("unsupported protocol '{other}'"))),
        };
        let hostname = match url.host_str() {
            Some(host) if !host.is_empty() => host.to_owned(),
            _ => return Err(invalid("missing hostname".to_owned())),
        };
        let port = url.port().unwrap_or_else(|| protocol.default_port());
        let base_path = url.path().trim_end_matches('/').to_owned();
        Ok(Self {
            protocol,
            hostname,
            port,
            base_path,
        })
    }
}

/// Connection details of a service. Credentials are never stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndevorConnection {
    pub location: ServiceLocation,
    #[serde(default)]
    pub reject_unauthorized: bool,
}

/// A configured Endevor service, persisted as `services/<name>.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndevorService {
    pub id: EndevorId,
    pub connection: EndevorConnection,
    /// Names of the search locations attached to this service, in the order
    /// they were added.
    #[serde(default)]
    pub search_locations: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EndevorService {
    pub fn uses_location(&self, location: &str) -> bool {
        self.search_locations.iter().any(|name| name == location)
    }
}

// ---------------------------------------------------------------------------
// Search locations
// ---------------------------------------------------------------------------

/// Inventory coordinates a search location browses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchLocation {
    pub environment: String,
    pub stage_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subsystem: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ccid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl SearchLocation {
    pub fn new(environment: impl Into<String>, stage_number: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            stage_number: stage_number.into(),
            system: None,
            subsystem: None,
            element_type: None,
            ccid: None,
            comment: None,
        }
    }
}

impl fmt::Display for SearchLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let any = |value: &Option<String>| value.clone().unwrap_or_else(|| "*".to_owned());
        write!(
            f,
            "{}/{}/{}/{}/{}",
            self.environment,
            self.stage_number,
            any(&self.system),
            any(&self.subsystem),
            any(&self.element_type),
        )
    }
}

/// A named search location, persisted as `locations/<name>.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndevorSearchLocation {
    pub id: EndevorId,
    pub location: SearchLocation,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Elements and tree nodes
// ---------------------------------------------------------------------------

/// One mainframe source element, located by its inventory coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndevorElement {
    pub environment: String,
    pub stage_number: String,
    pub system: String,
    pub sub_system: String,
    #[serde(rename = "type")]
    pub element_type: String,
    pub name: String,
    /// Alias of `name` until elements carry a richer identifier.
    pub id: String,
}

impl EndevorElement {
    pub fn new(
        environment: impl Into<String>,
        stage_number: impl Into<String>,
        system: impl Into<String>,
        sub_system: impl Into<String>,
        element_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            environment: environment.into(),
            stage_number: stage_number.into(),
            system: system.into(),
            sub_system: sub_system.into(),
            element_type: element_type.into(),
            id: name.clone(),
            name,
        }
    }
}

impl fmt::Display for EndevorElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}/{}",
            self.environment,
            self.stage_number,
            self.system,
            self.sub_system,
            self.element_type,
            self.name
        )
    }
}

/// An element shown under a search location of a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementNode {
    pub service_id: EndevorId,
    pub search_location_id: EndevorId,
    pub element: EndevorElement,
}

/// Node of the service / location / element tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Service(EndevorId),
    Location {
        service_id: EndevorId,
        search_location_id: EndevorId,
    },
    Element(ElementNode),
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// User settings, persisted as `settings.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Workspace-relative folder that holds retrieved elements.
    pub edit_folder: PathBuf,
    /// Upper bound for a single external sync run.
    pub sync_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            edit_folder: PathBuf::from(".endevor"),
            sync_timeout_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
