//! Scrubbing of sensitive data from query strings.

use regex::Regex;
use std::sync::OnceLock;

static QUERY_VALUE: OnceLock<Regex> = OnceLock::new();

/// Replaces every query-parameter value with `******`, keeping the keys
/// and separators intact. Keys without a value are left alone.
pub fn redact_query_parameters(query: &str) -> String {
    let re = QUERY_VALUE
        .get_or_init(|| Regex::new(r"([A-Za-z0-9_.-]+=)[^&]+").expect("static pattern"));
    re.replace_all(query, "${1}******").into_owned()
}
