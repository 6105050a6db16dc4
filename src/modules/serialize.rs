use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::modules::error::EditorResult;
use crate::modules::logview::LogMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarySource {
    /// `/summary-data` rows, filtered and rendered locally
    #[default]
    Data,
    /// `/summary` fragment rendered by the backend
    Html,
}

/// Contents of `editor.toml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub backend_url: String,
    pub refresh_secs: u64,
    pub auto_refresh: bool,
    pub timeout_secs: u64,
    pub summary_source: SummarySource,
    pub log_mode: LogMode,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8080/".to_string(),
            refresh_secs: 5,
            auto_refresh: true,
            timeout_secs: 30,
            summary_source: SummarySource::Data,
            log_mode: LogMode::Classified,
        }
    }
}

pub fn load_config(path: &Path) -> EditorResult<EditorConfig> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(toml::from_str(&text)?),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(EditorConfig::default()),
        Err(err) => Err(err.into()),
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct StateFile {
    #[serde(default)]
    domain_note: String,
}

/// Client side storage for the note draft.
#[derive(Debug, Clone)]
pub struct DraftStore {
    path: PathBuf,
}

impl DraftStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> EditorResult<String> {
        match fs::read_to_string(&self.path) {
            Ok(text) => {
                let state: StateFile = toml::from_str(&text)?;
                Ok(state.domain_note)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self, note: &str) -> EditorResult<()> {
        let state = StateFile {
            domain_note: note.to_string(),
        };
        let toml_str = toml::to_string_pretty(&state)?;
        fs::write(&self.path, toml_str)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_files_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("editor.toml")).unwrap();
        assert_eq!(config, EditorConfig::default());

        let drafts = DraftStore::new(dir.path().join("state.toml"));
        assert_eq!(drafts.load().unwrap(), "");
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("editor.toml");
        fs::write(
            &path,
            "backend_url = \"http://squid-editor:8080/\"\nsummary_source = \"html\"\nlog_mode = \"plain\"\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.backend_url, "http://squid-editor:8080/");
        assert_eq!(config.summary_source, SummarySource::Html);
        assert_eq!(config.log_mode, LogMode::Plain);
        assert_eq!(config.refresh_secs, 5);
        assert!(config.auto_refresh);
    }

    #[test]
    fn bad_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("editor.toml");
        fs::write(&path, "refresh_secs = \"soon\"").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn draft_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let drafts = DraftStore::new(dir.path().join("state.toml"));
        drafts.save("ticket #42 \"quoted\"").unwrap();
        drafts.save("ticket #43").unwrap();
        assert_eq!(DraftStore::new(drafts.path()).load().unwrap(), "ticket #43");
    }
}
