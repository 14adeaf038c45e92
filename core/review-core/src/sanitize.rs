//! Sanitizers for everything that ends up in a file name, a prompt, or an
//! environment variable of the spawned agent.
//!
//! The prompt is handed to an external command-line agent, so any caller
//! controlled text (file paths, transcript titles, directory names) is reduced
//! to inert characters here before interpolation.

/// Maximum length of one file path inside the prompt.
pub const MAX_PATH_CHARS: usize = 256;

/// Maximum length of a queue identifier.
pub const MAX_QUEUE_ID_CHARS: usize = 64;

/// Maximum length of a state file stem derived from a session id.
pub const MAX_FILE_STEM_CHARS: usize = 128;

/// Replacement for neutralized characters.
const INERT: char = '_';

/// Characters with shell or template meaning that never survive into a prompt.
const PATH_METACHARACTERS: &[char] = &[
    '`', '$', '"', '\'', ';', '|', '&', '<', '>', '(', ')', '{', '}', '[', ']', '\\', '!', '*',
    '?', '~', '#', '%', '=',
];

/// Neutralizes a file path for interpolation into the review prompt.
///
/// Metacharacters and control characters become `_`; the result is cut to
/// [`MAX_PATH_CHARS`] characters.
pub fn prompt_path(path: &str) -> String {
    path.chars()
        .map(|c| {
            if c.is_control() || PATH_METACHARACTERS.contains(&c) {
                INERT
            } else {
                c
            }
        })
        .take(MAX_PATH_CHARS)
        .collect()
}

fn is_queue_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Restricts a queue identifier to `[A-Za-z0-9_-]`, at most
/// [`MAX_QUEUE_ID_CHARS`] long.
///
/// Disallowed characters are stripped, so `../etc` becomes `etc`. Returns
/// `None` when nothing usable is left.
pub fn queue_id(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| is_queue_char(*c))
        .take(MAX_QUEUE_ID_CHARS)
        .collect();
    let trimmed = cleaned.trim_matches(|c| c == '-' || c == '_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Lowercases text and collapses every run of non-alphanumerics into `-`.
///
/// `"Fix: Login Flow (v2)"` → `"fix-login-flow-v2"`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Maps a session id onto a file stem that cannot leave its directory.
///
/// The stem is a readable prefix plus the md5 of the raw id, so ids that
/// sanitize alike (`a/b`, `a_b`) still get distinct files.
pub fn file_stem(session_id: &str) -> String {
    let digest = format!("{:x}", md5::compute(session_id.as_bytes()));
    let prefix: String = session_id
        .chars()
        .map(|c| if is_queue_char(c) { c } else { INERT })
        .take(MAX_FILE_STEM_CHARS - digest.len() - 1)
        .collect();
    if prefix.is_empty() {
        digest
    } else {
        format!("{}-{}", prefix, digest)
    }
}
