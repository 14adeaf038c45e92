//! Task Identity Resolver: picks the queue the review agent files into.
//!
//! Precedence:
//! 1. `targetQueueId` from configuration
//! 2. the session title from the transcript, slugified, plus the kind suffix
//! 3. the working directory's base name, slugified, plus the kind suffix
//! 4. the kind's hardcoded default
//!
//! Every candidate is sanitized; one that sanitizes to nothing falls through.

use std::io::{BufRead, BufReader};
use std::path::Path;

use fs_err as fs;
use serde_json::Value;

use crate::config::DispatchConfig;
use crate::kinds::HookKind;
use crate::sanitize;

/// Returns the last title marker in a transcript JSONL file.
///
/// Recognized lines:
///
/// ```json
/// {"type":"summary","summary":"Fix login flow","leafUuid":"..."}
/// {"type":"custom-title","customTitle":"dev: auth rewrite"}
/// ```
///
/// Unreadable files yield `None`; unparseable lines are skipped.
pub fn read_session_title(transcript_path: &Path) -> Option<String> {
    let file = fs::File::open(transcript_path).ok()?;
    let reader = BufReader::new(file);

    let mut title = None;
    for raw in reader.split(b'\n') {
        let Ok(raw) = raw else { break };
        // Invalid UTF-8 spoils one line, not the rest of the transcript.
        let Ok(line) = std::str::from_utf8(&raw) else {
            continue;
        };
        if !line.contains("\"type\"") {
            continue;
        }
        if let Some(found) = title_from_line(line) {
            title = Some(found);
        }
    }
    title
}

fn title_from_line(line: &str) -> Option<String> {
    let value: Value = serde_json::from_str(line).ok()?;
    let text = match value.get("type")?.as_str()? {
        "summary" => value.get("summary")?.as_str()?,
        "custom-title" => value.get("customTitle")?.as_str()?,
        _ => return None,
    };
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Where the resolved queue id came from. Logged with each dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueSource {
    Config,
    SessionTitle,
    Directory,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedQueue {
    pub id: String,
    pub source: QueueSource,
}

/// Slug of `base` plus the kind suffix. The slug is shortened first so the
/// suffix always survives the queue id length limit.
fn with_suffix(kind: HookKind, base: &str) -> Option<String> {
    let suffix = kind.queue_suffix();
    let budget = sanitize::MAX_QUEUE_ID_CHARS.saturating_sub(suffix.len());
    let slug: String = sanitize::slugify(base).chars().take(budget).collect();
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        return None;
    }
    sanitize::queue_id(&format!("{}{}", slug, suffix))
}

/// Resolves the queue id. `session_label` is the transcript title, if any.
pub fn resolve_queue_id(
    kind: HookKind,
    config: &DispatchConfig,
    session_label: Option<&str>,
    cwd: &str,
) -> ResolvedQueue {
    if let Some(id) = config.target_queue_id.as_deref().and_then(sanitize::queue_id) {
        return ResolvedQueue {
            id,
            source: QueueSource::Config,
        };
    }

    if let Some(id) = session_label.and_then(|label| with_suffix(kind, label)) {
        return ResolvedQueue {
            id,
            source: QueueSource::SessionTitle,
        };
    }

    let dir_name = Path::new(cwd).file_name().and_then(|n| n.to_str());
    if let Some(id) = dir_name.and_then(|name| with_suffix(kind, name)) {
        return ResolvedQueue {
            id,
            source: QueueSource::Directory,
        };
    }

    ResolvedQueue {
        id: kind.default_queue_id().to_string(),
        source: QueueSource::Default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Defaults;
    use tempfile::tempdir;

    fn config() -> DispatchConfig {
        DispatchConfig::resolve(HookKind::Bug, &[&Defaults])
    }

    #[test]
    fn test_reads_last_title_marker() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("s1.jsonl");
        fs::write(
            &path,
            [
                r#"{"type":"summary","summary":"First title","leafUuid":"a"}"#,
                r#"{"type":"user","message":{"content":"hi"}}"#,
                "not json at all",
                r#"{"type":"custom-title","customTitle":"dev: auth rewrite"}"#,
                r#"{"type":"assistant","message":{"content":"ok"}}"#,
            ]
            .join("\n"),
        )
        .unwrap();

        assert_eq!(read_session_title(&path).as_deref(), Some("dev: auth rewrite"));
    }

    #[test]
    fn test_invalid_utf8_line_does_not_hide_later_titles() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("s1.jsonl");
        let mut bytes = Vec::new();
        bytes.extend_from_slice(br#"{"type":"summary","summary":"release-prep"}"#);
        bytes.extend_from_slice(b"\n\xff\xfe garbage\n");
        bytes.extend_from_slice(br#"{"type":"custom-title","customTitle":"dev: later"}"#);
        bytes.push(b'\n');
        fs::write(&path, bytes).unwrap();

        assert_eq!(read_session_title(&path).as_deref(), Some("dev: later"));
    }

    #[test]
    fn test_missing_transcript_yields_none() {
        let temp = tempdir().unwrap();
        assert_eq!(read_session_title(&temp.path().join("nope.jsonl")), None);
    }

    #[test]
    fn test_transcript_without_title_yields_none() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("s1.jsonl");
        fs::write(&path, r#"{"type":"user","message":{"content":"hi"}}"#).unwrap();
        assert_eq!(read_session_title(&path), None);
    }

    #[test]
    fn test_config_queue_wins() {
        let mut config = config();
        config.target_queue_id = Some("team-bugs".to_string());
        let resolved = resolve_queue_id(HookKind::Bug, &config, Some("dev work"), "/w/acme-api");
        assert_eq!(resolved.id, "team-bugs");
        assert_eq!(resolved.source, QueueSource::Config);
    }

    #[test]
    fn test_hostile_config_queue_is_stripped() {
        let mut config = config();
        config.target_queue_id = Some("../../tmp/$(id)".to_string());
        let resolved = resolve_queue_id(HookKind::Bug, &config, None, "/w/acme-api");
        assert_eq!(resolved.id, "tmpid");
    }

    #[test]
    fn test_unusable_config_queue_falls_through() {
        let mut config = config();
        config.target_queue_id = Some("../;".to_string());
        let resolved = resolve_queue_id(HookKind::Bug, &config, None, "/w/acme-api");
        assert_eq!(resolved.source, QueueSource::Directory);
    }

    #[test]
    fn test_title_beats_directory() {
        let resolved =
            resolve_queue_id(HookKind::TestCoverage, &config(), Some("Dev: Auth Rewrite"), "/w/acme-api");
        assert_eq!(resolved.id, "dev-auth-rewrite-qa");
        assert_eq!(resolved.source, QueueSource::SessionTitle);
    }

    #[test]
    fn test_directory_with_kind_suffix() {
        let resolved = resolve_queue_id(HookKind::Bug, &config(), None, "/w/acme-api");
        assert_eq!(resolved.id, "acme-api-bugfixes");
        assert_eq!(resolved.source, QueueSource::Directory);
    }

    #[test]
    fn test_long_title_keeps_kind_suffix() {
        let title = format!("dev {}", "word ".repeat(20));
        let bug = resolve_queue_id(HookKind::Bug, &config(), Some(&title), "/w/acme-api");
        let qa = resolve_queue_id(HookKind::TestCoverage, &config(), Some(&title), "/w/acme-api");

        assert!(bug.id.ends_with("-bugfixes"), "{}", bug.id);
        assert!(qa.id.ends_with("-qa"), "{}", qa.id);
        assert_ne!(bug.id, qa.id);
        assert!(bug.id.len() <= sanitize::MAX_QUEUE_ID_CHARS);
        assert!(!bug.id.contains("--"));
    }

    #[test]
    fn test_default_when_nothing_resolves() {
        let resolved = resolve_queue_id(HookKind::Docs, &config(), Some("!!!"), "/");
        assert_eq!(resolved.id, "docs-review");
        assert_eq!(resolved.source, QueueSource::Default);
    }
}
