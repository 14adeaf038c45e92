//! Response Emitter.
//!
//! This hook family never blocks a tool call, so there is exactly one response
//! and it is a constant: nothing computed upstream can make it malformed.

use std::io::{self, Write};

/// The only decision this hook ever emits.
pub const APPROVE: &str = r#"{"decision":"approve"}"#;

/// Writes the approve decision followed by a newline.
pub fn emit<W: Write>(out: &mut W) -> io::Result<()> {
    out.write_all(APPROVE.as_bytes())?;
    out.write_all(b"\n")?;
    out.flush()
}
