//! review-hook: CLI hook handler for background deep reviews.
//!
//! Called by Claude Code `PostToolUse` hooks configured in settings.json, one
//! process per tool call. Counts edits per session and, once a threshold is
//! reached, launches a detached headless agent to review the edited files.
//!
//! ## Subcommands
//!
//! - `handle <kind>`: Main hook handler, reads JSON from stdin, always approves
//! - `state <kind> <session-id>`: Print the stored accumulator for a session
//! - `reset <kind> <session-id>`: Reset a session's accumulator to zero

mod handle;
mod inspect;
mod logging;

use clap::{Parser, Subcommand};
use review_core::HookKind;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "review-hook")]
#[command(about = "Edit-threshold deep review dispatcher")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Handle a hook event (reads JSON from stdin, prints the decision)
    Handle {
        /// Reviewer kind: test-coverage, lint, file, bug, docs, security
        #[arg(value_name = "KIND")]
        kind: HookKind,
    },

    /// Print the stored edit accumulator for a session
    State {
        #[arg(value_name = "KIND")]
        kind: HookKind,

        #[arg(value_name = "SESSION_ID")]
        session_id: String,
    },

    /// Reset a session's edit accumulator
    Reset {
        #[arg(value_name = "KIND")]
        kind: HookKind,

        #[arg(value_name = "SESSION_ID")]
        session_id: String,
    },
}

fn invoked_as_handle() -> bool {
    std::env::args().nth(1).as_deref() == Some("handle")
}

fn main() -> ExitCode {
    let _logging_guard = logging::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if invoked_as_handle() && e.use_stderr() => {
            // A bad kind must not turn into a blocked tool call.
            tracing::error!(error = %e, "review-hook handle: invalid arguments");
            handle::drain_and_approve();
            return ExitCode::SUCCESS;
        }
        Err(e) => e.exit(),
    };

    match cli.command {
        Commands::Handle { kind } => {
            handle::run(kind);
            ExitCode::SUCCESS
        }
        Commands::State { kind, session_id } => match inspect::print_state(kind, &session_id) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Reset { kind, session_id } => match inspect::reset_state(kind, &session_id) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        },
    }
}
