//! Renders error reports into subject/body pairs for each channel.
//!
//! All functions here are pure: the same report always produces the same
//! strings. Report fields that were never supplied render as the literal
//! `None` sentinel.

use crate::redaction::redact_query_parameters;
use crate::report::{Report, RequestContext};
use serde_json::Value;
use std::fmt::Display;
use std::fmt::Write as _;

/// Sentinel shown in place of a report field that was never supplied.
const ABSENT: &str = "None";

/// A fully rendered message, ready for a delivery channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Email subject, or chat topic. Never contains raw CR/LF.
    pub subject: String,
    pub body: String,
}

/// Escapes CR and LF characters so a subject stays on one line.
pub fn escape_subject(subject: &str) -> String {
    subject.replace('\n', "\\n").replace('\r', "\\r")
}

fn or_absent<T: Display>(value: Option<&T>) -> String {
    value.map_or_else(|| ABSENT.to_string(), ToString::to_string)
}

/// Renders a JSON value the way it should read in a message: strings
/// unquoted, everything else in its JSON form.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => ABSENT.to_string(),
        other => other.to_string(),
    }
}

/// `"Full Name (email)"` when both are present, otherwise the anonymous
/// form, always suffixed with the deployment the report came from.
pub fn user_info_line(report: &Report) -> String {
    let user_info = match (report.user_full_name.as_deref(), report.user_email.as_deref()) {
        (Some(name), Some(email)) if !name.is_empty() && !email.is_empty() => {
            format!("{name} ({email})")
        }
        _ => "Anonymous user (not logged in)".to_string(),
    };
    format!(
        "{user_info} on {} deployment",
        or_absent(report.deployment.as_ref())
    )
}

/// The logger-origin line of a server report.
pub fn logger_line(report: &Report) -> String {
    format!(
        "Logger {}, from module {} line {}:",
        or_absent(report.logger_name.as_ref()),
        or_absent(report.log_module.as_ref()),
        or_absent(report.log_lineno.as_ref())
    )
}

/// The `Deployed code:` block, one line per `deployment_data` entry in
/// insertion order.
pub fn deployment_block(report: &Report) -> String {
    let mut block = String::from("Deployed code:\n");
    for (field, val) in &report.deployment_data {
        let _ = writeln!(block, "- {field}: {}", value_text(val));
    }
    block
}

/// The request-info lines shared by both server message variants. The
/// query string is redacted before it appears here.
fn request_lines(ctx: &RequestContext) -> String {
    let mut lines = format!(
        "- path: {}\n- {}: {}\n",
        or_absent(ctx.path.as_ref()),
        or_absent(ctx.method.as_ref()),
        or_absent(ctx.data.as_ref())
    );
    let _ = writeln!(
        lines,
        "- REMOTE_ADDR: \"{}\"",
        or_absent(ctx.remote_addr.as_ref())
    );
    let _ = writeln!(
        lines,
        "- QUERY_STRING: \"{}\"",
        redact_query_parameters(&or_absent(ctx.query_string.as_ref()))
    );
    let _ = writeln!(
        lines,
        "- SERVER_NAME: \"{}\"",
        or_absent(ctx.server_name.as_ref())
    );
    lines
}

/// The admin email for a browser report.
pub fn email_browser(report: &Report) -> Rendered {
    let subject = format!("Browser error for {}", user_info_line(report));

    let mut body = format!(
        "User: {} <{}> on {}\n\
         \n\
         Message:\n\
         {}\n\
         \n\
         Stacktrace:\n\
         {}\n\
         \n\
         IP address: {}\n\
         User agent: {}\n\
         href: {}\n\
         Server path: {}\n\
         Deployed version: {}\n",
        or_absent(report.user_full_name.as_ref()),
        or_absent(report.user_email.as_ref()),
        or_absent(report.deployment.as_ref()),
        or_absent(report.message.as_ref()),
        or_absent(report.stacktrace.as_ref()),
        or_absent(report.ip_address.as_ref()),
        or_absent(report.user_agent.as_ref()),
        or_absent(report.href.as_ref()),
        or_absent(report.server_path.as_ref()),
        or_absent(report.version.as_ref()),
    );

    if let Some(more_info) = &report.more_info {
        body.push_str("\nAdditional information:");
        for (key, value) in more_info {
            let _ = write!(body, "\n  {key}: {}", value_text(value));
        }
    }

    let _ = write!(body, "\n\nLog:\n{}", or_absent(report.log.as_ref()));

    Rendered {
        subject: escape_subject(&subject),
        body,
    }
}

/// The chat-stream message for a browser report.
pub fn chat_browser(report: &Report) -> Rendered {
    let subject = format!("JS error: {}", or_absent(report.user_email.as_ref()));
    let body = format!(
        "User: {}\nMessage: {}\n",
        user_info_line(report),
        or_absent(report.message.as_ref())
    );

    Rendered {
        subject: escape_subject(&subject),
        body,
    }
}

fn server_subject(report: &Report) -> String {
    format!(
        "{}: {}",
        or_absent(report.node.as_ref()),
        or_absent(report.message.as_ref())
    )
}

/// The admin email for a server report.
pub fn email_server(report: &Report) -> Rendered {
    let request_block = match &report.request {
        Some(ctx) => format!("Request info:\n{}", request_lines(ctx)),
        None => "Request info: none\n".to_string(),
    };

    let body = format!(
        "{}\n\
         Error generated by {}\n\
         \n\
         {}\n\
         \n\
         {}\n\
         \n\
         {}",
        logger_line(report),
        user_info_line(report),
        or_absent(report.stack_trace.as_ref()),
        deployment_block(report),
        request_block,
    );

    Rendered {
        subject: escape_subject(&server_subject(report)),
        body,
    }
}

/// The chat-stream message for a server report. Same content as the
/// email, with the stack trace and request info wrapped in code fences.
pub fn chat_server(report: &Report) -> Rendered {
    let request_block = match &report.request {
        Some(ctx) => format!("Request info:\n~~~~\n{}~~~~", request_lines(ctx)),
        None => "Request info: none".to_string(),
    };

    let body = format!(
        "{}\n\
         Error generated by {}\n\
         \n\
         ~~~~\n\
         {}\n\
         \n\
         ~~~~\n\
         {}\n\
         {}",
        logger_line(report),
        user_info_line(report),
        or_absent(report.stack_trace.as_ref()),
        deployment_block(report),
        request_block,
    );

    Rendered {
        subject: escape_subject(&server_subject(report)),
        body,
    }
}
