//! Relevance filter. Decides, without side effects, whether an event should
//! touch session state at all.

use std::fmt;
use std::path::Path;

use regex::Regex;

use crate::config::DispatchConfig;
use crate::event::DispatchEvent;
use crate::patterns::RE_PROJECT_FOLDER;

/// Tools whose calls produce file edits.
pub const EDIT_TOOLS: [&str; 4] = ["Edit", "MultiEdit", "Write", "NotebookEdit"];

/// Set in the review agent's environment; hooks firing inside it are ignored.
pub const CHILD_ENV: &str = "DEEP_REVIEW_CHILD";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    EmptyInput,
    MalformedInput(String),
    ReviewChild,
    NotAnEditTool(String),
    Disabled,
    DirectoryExcluded(String),
    KeywordMismatch(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EmptyInput => write!(f, "empty input"),
            SkipReason::MalformedInput(details) => write!(f, "malformed input: {}", details),
            SkipReason::ReviewChild => write!(f, "running inside a review agent"),
            SkipReason::NotAnEditTool(tool) => write!(f, "tool {} does not edit files", tool),
            SkipReason::Disabled => write!(f, "disabled by configuration"),
            SkipReason::DirectoryExcluded(dir) => write!(f, "directory {} excluded", dir),
            SkipReason::KeywordMismatch(label) => {
                write!(f, "session label '{}' matches no keyword", label)
            }
        }
    }
}

/// Returns true when this process was spawned by a dispatch.
pub fn is_review_child() -> bool {
    std::env::var(CHILD_ENV)
        .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false)
}

pub fn is_edit_tool(tool_name: &str) -> bool {
    EDIT_TOOLS.contains(&tool_name)
}

/// Checks the working directory against the inclusion policy.
///
/// With `directory_pattern` set, the base name must match that regex;
/// otherwise it must look like a `[prefix]-[name]` project folder.
pub fn directory_included(cwd: &str, directory_pattern: Option<&str>) -> bool {
    let base = match Path::new(cwd).file_name().and_then(|n| n.to_str()) {
        Some(base) => base,
        None => return false,
    };

    if let Some(pattern) = directory_pattern {
        match Regex::new(pattern) {
            Ok(re) => return re.is_match(base),
            Err(e) => {
                tracing::warn!(pattern = %pattern, error = %e, "Invalid directoryPattern, using default heuristic");
            }
        }
    }

    RE_PROJECT_FOLDER.is_match(base)
}

/// Keyword filter over the session label. An absent label passes, and so does
/// an empty keyword set.
pub fn keywords_match(config: &DispatchConfig, label: Option<&str>) -> bool {
    let label = match label {
        Some(label) => label.to_lowercase(),
        None => return true,
    };
    config.keyword_filters.is_empty()
        || config
            .keyword_filters
            .iter()
            .any(|keyword| label.contains(keyword.as_str()))
}

/// Applies every relevance rule in order. The tool check runs first so that
/// the common case (a non-edit tool) costs nothing.
pub fn check(
    event: &DispatchEvent,
    config: &DispatchConfig,
    label: Option<&str>,
) -> Result<(), SkipReason> {
    if !is_edit_tool(&event.tool_name) {
        return Err(SkipReason::NotAnEditTool(event.tool_name.clone()));
    }
    if !config.enabled {
        return Err(SkipReason::Disabled);
    }
    if !directory_included(&event.cwd, config.directory_pattern.as_deref()) {
        return Err(SkipReason::DirectoryExcluded(event.cwd.clone()));
    }
    if !keywords_match(config, label) {
        return Err(SkipReason::KeywordMismatch(label.unwrap_or_default().to_string()));
    }
    Ok(())
}
