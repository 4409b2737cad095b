//! errnotify - error-report notification dispatch
//!
//! This library formats captured error reports (from browser clients or
//! server-side exception handlers) into human-readable messages and
//! delivers them through administrator email and an internal team-chat
//! stream.

pub mod channels;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod formatting;
pub mod redaction;
pub mod report;

// Re-export the core types for convenience.
pub use dispatch::{DispatchError, Dispatcher};
pub use report::{InvalidReportKind, Report, ReportKind, RequestContext};
