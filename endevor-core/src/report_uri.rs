//! Read-only URIs pointing at generic action reports.
//!
//! ```text
//! e4e-readonly-generic-report:<report_id>.act?<percent-encoded JSON query>
//! ```

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ReportUriError;
use crate::types::EndevorId;

pub const GENERIC_REPORT_SCHEME: &str = "e4e-readonly-generic-report";
pub const ACTION_REPORT_EXTENSION: &str = "act";

/// Everything needed to fetch a report again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionReportUriQuery {
    pub service_id: EndevorId,
    pub search_location_id: EndevorId,
    pub object_name: String,
    pub report_id: String,
}

pub fn to_generic_report_uri(
    service_id: &EndevorId,
    search_location_id: &EndevorId,
    object_name: &str,
    report_id: &str,
) -> Result<Url, ReportUriError> {
    let query = ActionReportUriQuery {
        service_id: service_id.clone(),
        search_location_id: search_location_id.clone(),
        object_name: object_name.to_owned(),
        report_id: report_id.to_owned(),
    };
    let json = serde_json::to_string(&query)?;
    let raw = format!(
        "{GENERIC_REPORT_SCHEME}:{}.{ACTION_REPORT_EXTENSION}?{}",
        urlencoding::encode(report_id),
        urlencoding::encode(&json)
    );
    Ok(Url::parse(&raw)?)
}

pub fn from_generic_report_uri(uri: &Url) -> Result<ActionReportUriQuery, ReportUriError> {
    if uri.scheme() != GENERIC_REPORT_SCHEME {
        return Err(ReportUriError::WrongScheme {
            actual: uri.scheme().to_owned(),
            expected: GENERIC_REPORT_SCHEME,
        });
    }
    let query = uri.query().ok_or(ReportUriError::MissingQuery)?;
    let json = urlencoding::decode(query)?;
    Ok(serde_json::from_str(&json)?)
}

/// Parse a URI string first, then decode it.
pub fn parse_generic_report_uri(uri: &str) -> Result<ActionReportUriQuery, ReportUriError> {
    from_generic_report_uri(&Url::parse(uri)?)
}
