//! Normalized workspace responses handed to the UI / command layer.

use std::fmt;
use std::path::PathBuf;

use endevor_core::EndevorElement;
use serde::Serialize;

/// Overall verdict of a workspace operation.
///
/// Variants are declared in ascending severity, so `Ord` is the precedence
/// `ERROR > CONFLICT > WARNING > SUCCESS > NO_CHANGES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkspaceResponseStatus {
    NoChanges,
    Success,
    Warning,
    Conflict,
    Error,
}

impl WorkspaceResponseStatus {
    /// Collapse many signals into the highest-precedence one. An empty input
    /// means nothing changed.
    pub fn resolve(statuses: impl IntoIterator<Item = Self>) -> Self {
        statuses
            .into_iter()
            .max()
            .unwrap_or(WorkspaceResponseStatus::NoChanges)
    }
}

impl fmt::Display for WorkspaceResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkspaceResponseStatus::NoChanges => write!(f, "NO_CHANGES"),
            WorkspaceResponseStatus::Success => write!(f, "SUCCESS"),
            WorkspaceResponseStatus::Warning => write!(f, "WARNING"),
            WorkspaceResponseStatus::Conflict => write!(f, "CONFLICT"),
            WorkspaceResponseStatus::Error => write!(f, "ERROR"),
        }
    }
}

/// The operation the sync attempted on a failed element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkspaceOperation {
    Conflict,
    LocalDelete,
    RemoteDelete,
    Retrieve,
    Update,
}

impl fmt::Display for WorkspaceOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkspaceOperation::Conflict => write!(f, "conflict"),
            WorkspaceOperation::LocalDelete => write!(f, "local delete"),
            WorkspaceOperation::RemoteDelete => write!(f, "remote delete"),
            WorkspaceOperation::Retrieve => write!(f, "retrieve"),
            WorkspaceOperation::Update => write!(f, "update"),
        }
    }
}

/// An element waiting for a manual merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementConflictDetails {
    pub element: EndevorElement,
    pub file_uri: PathBuf,
}

/// An element whose action failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementErrorDetails {
    pub element: EndevorElement,
    pub error_messages: Vec<String>,
    pub file_uri: PathBuf,
    pub operation: WorkspaceOperation,
}

/// Status and messages of a workspace operation without per-element detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkspaceResponse {
    pub status: WorkspaceResponseStatus,
    pub messages: Vec<String>,
}

/// Outcome of a workspace sync; the variant decides which details exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkspaceSyncResponse {
    NoChanges {
        messages: Vec<String>,
    },
    Success {
        messages: Vec<String>,
    },
    Warning {
        messages: Vec<String>,
    },
    Error {
        messages: Vec<String>,
        #[serde(rename = "errorDetails")]
        error_details: Vec<ElementErrorDetails>,
    },
    Conflict {
        messages: Vec<String>,
        #[serde(rename = "conflictDetails")]
        conflict_details: Vec<ElementConflictDetails>,
    },
}

impl WorkspaceSyncResponse {
    pub fn status(&self) -> WorkspaceResponseStatus {
        match self {
            WorkspaceSyncResponse::NoChanges { .. } => WorkspaceResponseStatus::NoChanges,
            WorkspaceSyncResponse::Success { .. } => WorkspaceResponseStatus::Success,
            WorkspaceSyncResponse::Warning { .. } => WorkspaceResponseStatus::Warning,
            WorkspaceSyncResponse::Error { .. } => WorkspaceResponseStatus::Error,
            WorkspaceSyncResponse::Conflict { .. } => WorkspaceResponseStatus::Conflict,
        }
    }

    pub fn messages(&self) -> &[String] {
        match self {
            WorkspaceSyncResponse::NoChanges { messages }
            | WorkspaceSyncResponse::Success { messages }
            | WorkspaceSyncResponse::Warning { messages }
            | WorkspaceSyncResponse::Error { messages, .. }
            | WorkspaceSyncResponse::Conflict { messages, .. } => messages,
        }
    }

    pub fn is_error_response(&self) -> bool {
        matches!(self, WorkspaceSyncResponse::Error { .. })
    }

    pub fn is_conflict_response(&self) -> bool {
        matches!(self, WorkspaceSyncResponse::Conflict { .. })
    }
}
