//! Dispatch configuration.
//!
//! Each hook kind reads its section (see [`HookKind::config_key`]) from an
//! ordered list of providers. Fields resolve independently: the first provider
//! that has a present, well-typed value for a field wins.
//!
//! ```text
//! <cwd>/.claude/settings.json   (project)
//!   → ~/.claude/settings.json   (global)
//!     → Defaults                (threshold 3, keywords ["dev"], enabled)
//! ```
//!
//! Example section:
//!
//! ```json
//! { "bugReviewer": { "editThreshold": 5, "keywordFilters": ["dev", "fix"] } }
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use fs_err as fs;
use serde_json::{Map, Value};

use crate::kinds::HookKind;
use crate::storage::StorageConfig;

pub const DEFAULT_EDIT_THRESHOLD: i64 = 3;
pub const DEFAULT_KEYWORD: &str = "dev";
pub const DEFAULT_AGENT_COMMAND: &str = "claude";

/// Fully resolved configuration for one invocation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    pub target_queue_id: Option<String>,
    /// Raw configured value; the evaluator clamps it into range.
    pub edit_threshold: i64,
    /// Lowercase keywords; empty means "no keyword filter".
    pub keyword_filters: BTreeSet<String>,
    pub enabled: bool,
    /// Replaces the project-folder heuristic when set.
    pub directory_pattern: Option<String>,
    pub agent_command: String,
}

/// One layer of configuration. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialConfig {
    pub target_queue_id: Option<String>,
    pub edit_threshold: Option<i64>,
    pub keyword_filters: Option<BTreeSet<String>>,
    pub enabled: Option<bool>,
    pub directory_pattern: Option<String>,
    pub agent_command: Option<String>,
}

impl PartialConfig {
    /// Fills every field still absent from `lower`.
    fn or(self, lower: PartialConfig) -> PartialConfig {
        PartialConfig {
            target_queue_id: self.target_queue_id.or(lower.target_queue_id),
            edit_threshold: self.edit_threshold.or(lower.edit_threshold),
            keyword_filters: self.keyword_filters.or(lower.keyword_filters),
            enabled: self.enabled.or(lower.enabled),
            directory_pattern: self.directory_pattern.or(lower.directory_pattern),
            agent_command: self.agent_command.or(lower.agent_command),
        }
    }

    /// Extracts known fields from a settings section, dropping ill-typed ones.
    pub fn from_section(section: &Map<String, Value>, origin: &str) -> PartialConfig {
        PartialConfig {
            target_queue_id: string_field(section, "targetQueueId", origin),
            edit_threshold: integer_field(section, "editThreshold", origin),
            keyword_filters: keywords_field(section, "keywordFilters", origin),
            enabled: bool_field(section, "enabled", origin),
            directory_pattern: string_field(section, "directoryPattern", origin),
            agent_command: string_field(section, "agentCommand", origin),
        }
    }
}

fn warn_ill_typed(origin: &str, key: &str, expected: &str) {
    tracing::warn!(origin = %origin, key = %key, expected = %expected, "Ignoring ill-typed config value");
}

fn string_field(section: &Map<String, Value>, key: &str, origin: &str) -> Option<String> {
    match section.get(key)? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.trim().to_string()),
        _ => {
            warn_ill_typed(origin, key, "string");
            None
        }
    }
}

fn integer_field(section: &Map<String, Value>, key: &str, origin: &str) -> Option<i64> {
    match section.get(key)? {
        Value::Null => None,
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|_| i64::MAX))
            .or_else(|| n.as_f64().map(|f| f.round() as i64)),
        _ => {
            warn_ill_typed(origin, key, "integer");
            None
        }
    }
}

fn bool_field(section: &Map<String, Value>, key: &str, origin: &str) -> Option<bool> {
    match section.get(key)? {
        Value::Null => None,
        Value::Bool(b) => Some(*b),
        _ => {
            warn_ill_typed(origin, key, "boolean");
            None
        }
    }
}

fn keywords_field(
    section: &Map<String, Value>,
    key: &str,
    origin: &str,
) -> Option<BTreeSet<String>> {
    match section.get(key)? {
        Value::Null => None,
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        ),
        _ => {
            warn_ill_typed(origin, key, "array of strings");
            None
        }
    }
}

/// A source of configuration, queried in priority order.
pub trait ConfigProvider {
    /// Human-readable origin for diagnostics.
    fn origin(&self) -> String;

    fn load(&self, kind: HookKind) -> PartialConfig;
}

/// A Claude Code settings document (`settings.json`).
#[derive(Debug, Clone)]
pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn project(cwd: &Path) -> Self {
        Self::new(StorageConfig::project_settings_file(cwd))
    }

    pub fn global(storage: &StorageConfig) -> Self {
        Self::new(storage.global_settings_file())
    }
}

impl ConfigProvider for SettingsFile {
    fn origin(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self, kind: HookKind) -> PartialConfig {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return PartialConfig::default(),
        };
        if content.trim().is_empty() {
            return PartialConfig::default();
        }

        let document: Value = match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Settings file malformed, skipping");
                return PartialConfig::default();
            }
        };

        match document.get(kind.config_key()) {
            Some(Value::Object(section)) => PartialConfig::from_section(section, &self.origin()),
            Some(Value::Null) | None => PartialConfig::default(),
            Some(_) => {
                warn_ill_typed(&self.origin(), kind.config_key(), "object");
                PartialConfig::default()
            }
        }
    }
}

/// Hardcoded fallback layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Defaults;

impl ConfigProvider for Defaults {
    fn origin(&self) -> String {
        "defaults".to_string()
    }

    fn load(&self, _kind: HookKind) -> PartialConfig {
        PartialConfig {
            target_queue_id: None,
            edit_threshold: Some(DEFAULT_EDIT_THRESHOLD),
            keyword_filters: Some(BTreeSet::from([DEFAULT_KEYWORD.to_string()])),
            enabled: Some(true),
            directory_pattern: None,
            agent_command: Some(DEFAULT_AGENT_COMMAND.to_string()),
        }
    }
}

impl DispatchConfig {
    /// Merges providers in priority order (first present value wins).
    pub fn resolve(kind: HookKind, providers: &[&dyn ConfigProvider]) -> DispatchConfig {
        let merged = providers
            .iter()
            .fold(PartialConfig::default(), |acc, provider| {
                acc.or(provider.load(kind))
            })
            .or(Defaults.load(kind));

        DispatchConfig {
            target_queue_id: merged.target_queue_id,
            edit_threshold: merged.edit_threshold.unwrap_or(DEFAULT_EDIT_THRESHOLD),
            keyword_filters: merged.keyword_filters.unwrap_or_default(),
            enabled: merged.enabled.unwrap_or(true),
            directory_pattern: merged.directory_pattern,
            agent_command: merged
                .agent_command
                .unwrap_or_else(|| DEFAULT_AGENT_COMMAND.to_string()),
        }
    }

    /// Standard precedence: project settings, then global settings, then defaults.
    pub fn load(kind: HookKind, storage: &StorageConfig, cwd: &Path) -> DispatchConfig {
        let project = SettingsFile::project(cwd);
        let global = SettingsFile::global(storage);
        Self::resolve(kind, &[&project, &global, &Defaults])
    }
}
