//! Reconciles the per-element results of an external workspace sync into one
//! [`WorkspaceSyncResponse`].
//!
//! Every action contributes at most one status. The overall status is the
//! highest-precedence status among the action statuses and the baseline
//! derived from the response-level status. An unresolved merge conflict
//! flagged by the response always yields a `CONFLICT` response, even when an
//! action failed.

use std::collections::BTreeSet;

use endevor_core::EndevorElement;

use crate::external::{
    ActionStatus, ActionStatusDetailed, ActionType, ElementAction, ExternalWorkspaceResponse,
};
use crate::response::{
    ElementConflictDetails, ElementErrorDetails, WorkspaceOperation, WorkspaceResponse,
    WorkspaceResponseStatus, WorkspaceSyncResponse,
};

/// Status and messages of a workspace operation that carries no actions.
pub fn classify_plain_response(external: &ExternalWorkspaceResponse) -> WorkspaceResponse {
    WorkspaceResponse {
        status: baseline_status(external.status),
        messages: response_messages(external),
    }
}

/// Classify the response of a workspace sync.
pub fn classify_sync_response(external: &ExternalWorkspaceResponse) -> WorkspaceSyncResponse {
    let messages = response_messages(external);
    let baseline = baseline_status(external.status);
    let details = collect_action_details(&external.actions);

    let resolved =
        WorkspaceResponseStatus::resolve(details.statuses.iter().copied().chain([baseline]));
    let overall = if external.unresolved_merge_conflicts {
        WorkspaceResponseStatus::Conflict
    } else {
        resolved
    };
    tracing::debug!(
        %baseline,
        %resolved,
        %overall,
        actions = external.actions.len(),
        unresolved_merge_conflicts = external.unresolved_merge_conflicts,
        "classified workspace sync response"
    );

    match overall {
        WorkspaceResponseStatus::NoChanges => WorkspaceSyncResponse::NoChanges { messages },
        WorkspaceResponseStatus::Success => WorkspaceSyncResponse::Success { messages },
        WorkspaceResponseStatus::Warning => WorkspaceSyncResponse::Warning { messages },
        WorkspaceResponseStatus::Error => WorkspaceSyncResponse::Error {
            messages,
            error_details: details.errors,
        },
        WorkspaceResponseStatus::Conflict => WorkspaceSyncResponse::Conflict {
            messages,
            conflict_details: details.conflicts,
        },
    }
}

#[derive(Debug, Default)]
struct ActionDetails {
    statuses: BTreeSet<WorkspaceResponseStatus>,
    conflicts: Vec<ElementConflictDetails>,
    errors: Vec<ElementErrorDetails>,
}

fn collect_action_details(actions: &[ElementAction]) -> ActionDetails {
    let mut details = ActionDetails::default();
    for action in actions {
        let Some(operation) = operation_for(action.action) else {
            tracing::debug!(
                element = %action.full_element_name,
                "skipping action of unknown kind"
            );
            continue;
        };
        let status = match (action.status, action.status_detailed) {
            // a manual merge from an earlier sync is still unresolved
            (ActionStatus::NotRun, Some(ActionStatusDetailed::NotRunManualMergeInProgress))
            // a manual merge is required for the first time
            | (ActionStatus::Success, Some(ActionStatusDetailed::SuccessManualMergeStarted)) => {
                details.conflicts.push(ElementConflictDetails {
                    element: element_of(action),
                    file_uri: action.local_file.clone(),
                });
                WorkspaceResponseStatus::Conflict
            }
            (ActionStatus::NotRun, _) => WorkspaceResponseStatus::NoChanges,
            (ActionStatus::Success, _) => WorkspaceResponseStatus::Success,
            (ActionStatus::Warning, _) => WorkspaceResponseStatus::Warning,
            (ActionStatus::Failure, _) => {
                details.errors.push(ElementErrorDetails {
                    element: element_of(action),
                    error_messages: action.error_messages.clone().unwrap_or_default(),
                    file_uri: action.local_file.clone(),
                    operation,
                });
                WorkspaceResponseStatus::Error
            }
        };
        details.statuses.insert(status);
    }
    details
}

fn operation_for(action: ActionType) -> Option<WorkspaceOperation> {
    match action {
        ActionType::Conflict => Some(WorkspaceOperation::Conflict),
        ActionType::LocalDelete => Some(WorkspaceOperation::LocalDelete),
        ActionType::RemoteDelete => Some(WorkspaceOperation::RemoteDelete),
        ActionType::Retrieve => Some(WorkspaceOperation::Retrieve),
        ActionType::Update => Some(WorkspaceOperation::Update),
        ActionType::Unknown => None,
    }
}

fn element_of(action: &ElementAction) -> EndevorElement {
    EndevorElement::new(
        &action.environment,
        &action.stage_number,
        &action.system,
        &action.subsystem,
        &action.element_type,
        &action.full_element_name,
    )
}

fn baseline_status(status: ActionStatus) -> WorkspaceResponseStatus {
    match status {
        ActionStatus::Failure => WorkspaceResponseStatus::Error,
        ActionStatus::Warning => WorkspaceResponseStatus::Warning,
        ActionStatus::Success | ActionStatus::NotRun => WorkspaceResponseStatus::Success,
    }
}

/// Errors, then warnings, then info; each tagged and trimmed.
fn response_messages(external: &ExternalWorkspaceResponse) -> Vec<String> {
    fn tagged<'a>(tag: &'a str, messages: &'a [String]) -> impl Iterator<Item = String> + 'a {
        messages
            .iter()
            .map(move |message| format!("{tag} {message}").trim().to_owned())
    }

    tagged("[ERROR]", &external.error_messages)
        .chain(tagged("[WARN]", &external.warning_messages))
        .chain(tagged("[INFO]", &external.info_messages))
        .collect()
}
