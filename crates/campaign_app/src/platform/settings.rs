use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use campaign_engine::StreamSettings;
use serde::{Deserialize, Serialize};

use super::logging::LogDestination;

/// Settings read from a RON file; every field may be omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where to write `results.json` / `errors.json` when the stream ends.
    pub export_dir: Option<PathBuf>,
    /// Upper bound on how long the loop waits for an event before re-rendering.
    pub render_interval_ms: u64,
    pub log_destination: LogDestination,
    pub stream: StreamSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            export_dir: None,
            render_interval_ms: 250,
            log_destination: LogDestination::Terminal,
            stream: StreamSettings::default(),
        }
    }
}

/// Load settings from `path`. No path or a missing file yields defaults.
pub fn load(path: Option<&Path>) -> anyhow::Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(Settings::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read settings from {path:?}"));
        }
    };
    ron::from_str(&content).with_context(|| format!("failed to parse settings from {path:?}"))
}
