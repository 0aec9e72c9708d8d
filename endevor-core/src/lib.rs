//! Endevor core library: domain types, the configuration store, report URIs.
//!
//! - [`types`]: ids, connections, search locations, elements, tree nodes
//! - [`error`]: [`StoreError`], [`ReportUriError`]
//! - [`store`]: services / search locations / settings under `~/.endevor/`
//! - [`report_uri`]: generic action report URIs
//! - [`utils`]: grouping and workspace path helpers

pub mod error;
pub mod report_uri;
pub mod store;
pub mod types;
pub mod utils;

pub use error::{ReportUriError, StoreError};
pub use types::{
    ElementNode, EndevorConnection, EndevorElement, EndevorId, EndevorSearchLocation,
    EndevorService, Node, SearchLocation, ServiceLocation, ServiceProtocol, Settings, Source,
};
