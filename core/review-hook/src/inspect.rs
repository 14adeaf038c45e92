//! Maintenance commands over the state store.

use review_core::{FileStateStore, HookKind, SessionState, StateStore, StorageConfig};

pub fn print_state(kind: HookKind, session_id: &str) -> Result<(), String> {
    let store = FileStateStore::new(StorageConfig::from_env()?);
    let state = store.load(kind, session_id);
    let json = serde_json::to_string_pretty(&state)
        .map_err(|e| format!("Failed to serialize state: {}", e))?;
    println!("{}", json);
    Ok(())
}

pub fn reset_state(kind: HookKind, session_id: &str) -> Result<(), String> {
    let store = FileStateStore::new(StorageConfig::from_env()?);
    store.save(kind, session_id, &SessionState::fresh(session_id))?;
    tracing::info!(kind = %kind, session = %session_id, "Session state reset");
    println!("Reset {} state for session {}", kind, session_id);
    Ok(())
}
