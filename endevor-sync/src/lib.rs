//! # endevor-sync
//!
//! Workspace sync response reconciliation.
//!
//! Decode the external sync output with [`parse_response`] or
//! [`load_response`], then call [`classify_sync_response`] to get a
//! [`WorkspaceSyncResponse`] whose variant tells the caller whether to show
//! conflict resolution, report errors, or carry on.

pub mod classify;
pub mod error;
pub mod external;
pub mod response;
pub mod timeout;

pub use classify::{classify_plain_response, classify_sync_response};
pub use error::{SyncError, TimeoutError};
pub use external::{
    load_response, parse_response, ActionStatus, ActionStatusDetailed, ActionType, ElementAction,
    ExternalWorkspaceResponse,
};
pub use response::{
    ElementConflictDetails, ElementErrorDetails, WorkspaceOperation, WorkspaceResponse,
    WorkspaceResponseStatus, WorkspaceSyncResponse,
};
pub use timeout::with_timeout;
