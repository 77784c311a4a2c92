//! App state persistence: JSON save/load of UI preferences across restarts.
//!
//! Only preferences are kept: the last file path, the drug selection, the
//! active panel and the failure policy. Uploaded contents and results are not.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use pharmaguard_core::{DrugSelection, FailurePolicy};

use crate::app::{AppState, Overlay, Panel};

/// Serializable subset of app state that persists across restarts.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub last_path: Option<PathBuf>,
    pub drugs: DrugSelection,
    pub active_panel: Panel,
    pub policy: Option<FailurePolicy>,
    pub welcome_dismissed: bool,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            last_path: None,
            drugs: DrugSelection::new(),
            active_panel: Panel::Upload,
            policy: None,
            welcome_dismissed: false,
        }
    }
}

/// `{config_dir}/pharmaguard/state.json`.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pharmaguard")
        .join("state.json")
}

/// Load persisted state from disk. Returns defaults if file is missing or corrupt.
pub fn load(path: &Path) -> PersistedState {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
        Err(_) => PersistedState::default(),
    }
}

/// Save persisted state to disk. Creates parent directories if needed.
pub fn save(path: &Path, state: &PersistedState) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Extract persisted state from AppState.
pub fn extract(app: &AppState) -> PersistedState {
    PersistedState {
        last_path: app.upload.last_path.clone(),
        drugs: app.upload.drugs.clone(),
        active_panel: app.active_panel,
        policy: Some(app.policy),
        welcome_dismissed: app.overlay != Overlay::Welcome,
    }
}

/// Apply persisted state to AppState. The file itself is not reloaded; the
/// path only pre-fills the path prompt.
pub fn apply(app: &mut AppState, state: PersistedState) {
    app.upload.last_path = state.last_path;
    app.upload.drugs = state.drugs;
    app.active_panel = state.active_panel;
    if let Some(policy) = state.policy {
        app.policy = policy;
    }
    if !state.welcome_dismissed {
        app.overlay = Overlay::Welcome;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let state = PersistedState {
            last_path: Some(PathBuf::from("/data/patient.vcf")),
            drugs: DrugSelection::from_names(["WARFARIN", "tamoxifen"]),
            active_panel: Panel::Json,
            policy: Some(FailurePolicy::Synthesize),
            welcome_dismissed: true,
        };

        save(&path, &state).unwrap();
        let loaded = load(&path);

        assert_eq!(loaded.last_path, state.last_path);
        assert_eq!(loaded.drugs.selected(), ["WARFARIN", "TAMOXIFEN"]);
        assert_eq!(loaded.active_panel, Panel::Json);
        assert_eq!(loaded.policy, Some(FailurePolicy::Synthesize));
        assert!(loaded.welcome_dismissed);
    }

    #[test]
    fn missing_file_returns_defaults() {
        let loaded = load(Path::new("/nonexistent/path/state.json"));
        assert!(loaded.drugs.is_empty());
        assert!(!loaded.welcome_dismissed);
    }

    #[test]
    fn corrupt_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not valid json {{{").unwrap();

        let loaded = load(&path);
        assert!(loaded.drugs.is_empty());
        assert_eq!(loaded.active_panel, Panel::Upload);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, r#"{"active_panel": "Help"}"#).unwrap();

        let loaded = load(&path);
        assert_eq!(loaded.active_panel, Panel::Help);
        assert!(loaded.policy.is_none());
    }
}
