//! Compiled regex patterns, built once on first use.

use once_cell::sync::Lazy;
use regex::Regex;

/// Default inclusion heuristic: a directory named like `[prefix]-[name]`
/// (`acme-api`, `web-dashboard`, `rs-parser.v2`).
pub static RE_PROJECT_FOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+-[A-Za-z0-9][A-Za-z0-9._-]*$").unwrap());
