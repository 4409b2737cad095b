//! The error report entity and its classification.
//!
//! A `Report` is transient: the caller builds one, hands it to the
//! dispatcher, and discards it. Every field is optional; anything the
//! capturing side did not supply renders as the `None` sentinel in the
//! formatted output.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;
use thiserror::Error;

/// A captured error report from a browser client or a server-side
/// exception handler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Report {
    /// Full name of the affected user, if logged in.
    pub user_full_name: Option<String>,
    /// Email of the affected user, if logged in.
    pub user_email: Option<String>,
    /// The error message text.
    pub message: Option<String>,
    /// Client-side stack trace (browser reports).
    pub stacktrace: Option<String>,
    /// Server-side stack trace (server reports).
    pub stack_trace: Option<String>,
    /// Name of the logger that captured the error (server reports).
    pub logger_name: Option<String>,
    /// Module the log record originated from (server reports).
    pub log_module: Option<String>,
    /// Line number of the log record (server reports).
    pub log_lineno: Option<u64>,
    /// Deployment name; filled in by the dispatcher, not the caller.
    pub deployment: Option<String>,
    /// Hostname of the node the error occurred on (server reports).
    pub node: Option<String>,
    /// Deployed version string reported by the client (browser reports).
    pub version: Option<String>,
    /// Facts about the deployed code (e.g. git describe output), in
    /// insertion order.
    pub deployment_data: Map<String, Value>,
    /// Client IP address (browser reports).
    pub ip_address: Option<String>,
    /// Client user agent (browser reports).
    pub user_agent: Option<String>,
    /// Page URL the error was reported from (browser reports).
    pub href: Option<String>,
    /// Server path the client was talking to (browser reports).
    pub server_path: Option<String>,
    /// Extra key/value context supplied by the client, in insertion order.
    pub more_info: Option<Map<String, Value>>,
    /// Tail of the client-side log (browser reports).
    pub log: Option<String>,
    /// HTTP request context, when the error happened inside a request
    /// (server reports).
    pub request: Option<RequestContext>,
}

/// HTTP request context attached to a server report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct RequestContext {
    /// Request path.
    pub path: Option<String>,
    /// HTTP method.
    pub method: Option<String>,
    /// Request body or form data, already stringified by the caller.
    pub data: Option<String>,
    /// Peer address.
    pub remote_addr: Option<String>,
    /// Raw query string; redacted before it appears in any message.
    pub query_string: Option<String>,
    /// Server hostname handling the request.
    pub server_name: Option<String>,
}

/// Where a report was captured, which decides how it is formatted and
/// which channels receive it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Browser,
    Server,
}

/// Error returned when a report kind string is neither "browser" nor
/// "server".
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid report kind {0:?} (expected \"browser\" or \"server\")")]
pub struct InvalidReportKind(pub String);

impl FromStr for ReportKind {
    type Err = InvalidReportKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "browser" => Ok(ReportKind::Browser),
            "server" => Ok(ReportKind::Server),
            other => Err(InvalidReportKind(other.to_string())),
        }
    }
}
