//! The response produced by the external workspace sync operation.
//!
//! Field names follow the JSON emitted by the sync client (camelCase). A
//! `status` outside [`ActionStatus`] is a decode error; unknown action kinds
//! and detailed statuses decode to catch-all variants instead.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, SyncError};

/// Status of the whole run or of one element action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionStatus {
    NotRun,
    Success,
    Warning,
    Failure,
}

/// Refinement of `NOT_RUN` / `SUCCESS` into manual merge states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionStatusDetailed {
    NotRunManualMergeInProgress,
    SuccessManualMergeStarted,
    #[serde(other)]
    Other,
}

/// What the sync did (or tried to do) to one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    Conflict,
    LocalDelete,
    RemoteDelete,
    Retrieve,
    Update,
    #[serde(other)]
    Unknown,
}

/// One record per element touched by a sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementAction {
    pub environment: String,
    pub stage_number: String,
    pub system: String,
    pub subsystem: String,
    #[serde(rename = "type")]
    pub element_type: String,
    pub full_element_name: String,
    pub local_file: PathBuf,
    pub action: ActionType,
    pub status: ActionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_detailed: Option<ActionStatusDetailed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_messages: Option<Vec<String>>,
}

/// Overall response of a workspace operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalWorkspaceResponse {
    pub status: ActionStatus,
    #[serde(default)]
    pub error_messages: Vec<String>,
    #[serde(default)]
    pub warning_messages: Vec<String>,
    #[serde(default)]
    pub info_messages: Vec<String>,
    #[serde(default)]
    pub unresolved_merge_conflicts: bool,
    #[serde(default)]
    pub actions: Vec<ElementAction>,
}

impl ExternalWorkspaceResponse {
    /// A response with the given status and nothing else.
    pub fn with_status(status: ActionStatus) -> Self {
        Self {
            status,
            error_messages: vec![],
            warning_messages: vec![],
            info_messages: vec![],
            unresolved_merge_conflicts: false,
            actions: vec![],
        }
    }
}

/// Decode a response from its JSON text.
pub fn parse_response(json: &str) -> Result<ExternalWorkspaceResponse, SyncError> {
    serde_json::from_str(json).map_err(SyncError::Parse)
}

/// Read and decode a response saved to disk.
pub fn load_response(path: &Path) -> Result<ExternalWorkspaceResponse, SyncError> {
    let json = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    parse_response(&json)
}
