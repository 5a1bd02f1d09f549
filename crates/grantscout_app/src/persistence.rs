//! Staged-link state file.
//!
//! Links that were staged but never successfully submitted are kept in
//! `.grantscout_state.ron` so the next `discover` run can restore them.

use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::Utc;
use client_logging::{client_error, client_info, client_warn};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

const STATE_FILENAME: &str = ".grantscout_state.ron";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedState {
    staged_links: Vec<String>,
    last_run_utc: Option<String>,
}

/// Staged links left over from a run whose trigger never succeeded.
pub(crate) fn load_staged_links(state_dir: &Path) -> Vec<String> {
    let path = state_dir.join(STATE_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Vec::new();
        }
        Err(err) => {
            client_warn!("Failed to read persisted state from {:?}: {}", path, err);
            return Vec::new();
        }
    };

    let state: PersistedState = match ron::from_str(&content) {
        Ok(state) => state,
        Err(err) => {
            client_warn!("Failed to parse persisted state from {:?}: {}", path, err);
            return Vec::new();
        }
    };

    if !state.staged_links.is_empty() {
        client_info!("Loaded persisted staged links from {:?}", path);
    }
    state.staged_links
}

/// Replaces the state file with the current staged set, stamped with the
/// run time. An empty set is written out too: a successful trigger consumes
/// the staged links, and the file must reflect that.
pub(crate) fn save_staged_links(state_dir: &Path, staged_links: &[String]) {
    let state = PersistedState {
        staged_links: staged_links.to_vec(),
        last_run_utc: Some(Utc::now().to_rfc3339()),
    };

    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(&state, pretty) {
        Ok(text) => text,
        Err(err) => {
            client_error!("Failed to serialize persisted state: {}", err);
            return;
        }
    };

    if let Err(err) = replace_state_file(state_dir, &content) {
        client_error!(
            "Failed to write persisted state to {:?}: {}",
            state_dir,
            err
        );
    }
}

/// The write goes through a temp file in the state directory followed by a
/// rename, so an interrupted run never leaves a truncated state file for
/// the next `load_staged_links` to trip over.
fn replace_state_file(state_dir: &Path, content: &str) -> std::io::Result<()> {
    let target = state_dir.join(STATE_FILENAME);
    let mut tmp = NamedTempFile::new_in(state_dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    if target.exists() {
        fs::remove_file(&target)?;
    }
    tmp.persist(&target).map_err(|err| err.error)?;
    Ok(())
}
