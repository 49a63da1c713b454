use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::constants::{
    API_KEY_ENV_VAR, COACH_MODEL, COACH_TEMPERATURE, DEFAULT_GRADE_LEVEL, MAX_BATCH_WORKERS,
    MAX_GRADE_LEVEL, OPENAI_API_BASE_URL, REQUEST_TIMEOUT_SECS, SETTINGS_DIR_NAME, SETTINGS_FILE_NAME,
    TRANSCRIPTION_MODEL,
};

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid settings in {path}: grade_level {grade} is above {max}")]
    GradeOutOfRange { path: PathBuf, grade: u8, max: u8 },
}

/// Service and evaluation settings, stored as JSON.
///
/// Every field is optional in the file; missing ones take their defaults.
/// The API key is never stored here, see [`Settings::api_key`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    pub transcription_model: String,
    pub coach_model: String,
    pub coach_temperature: f32,
    pub grade_level: u8,
    pub request_timeout_secs: u64,
    pub batch_workers: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: OPENAI_API_BASE_URL.to_string(),
            transcription_model: TRANSCRIPTION_MODEL.to_string(),
            coach_model: COACH_MODEL.to_string(),
            coach_temperature: COACH_TEMPERATURE,
            grade_level: DEFAULT_GRADE_LEVEL,
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            batch_workers: default_batch_workers(),
        }
    }
}

impl Settings {
    /// `<config dir>/ReadTogether/settings.json`, if the platform has one.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(SETTINGS_DIR_NAME).join(SETTINGS_FILE_NAME))
    }

    /// Loads from the platform config path. A missing file yields defaults.
    pub fn load() -> Result<Self, SettingsError> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Loads from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|e| SettingsError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let settings: Self = serde_json::from_str(&json).map_err(|e| SettingsError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        if settings.grade_level > MAX_GRADE_LEVEL {
            return Err(SettingsError::GradeOutOfRange {
                path: path.to_path_buf(),
                grade: settings.grade_level,
                max: MAX_GRADE_LEVEL,
            });
        }
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// API key from the environment; blank values count as unset.
    pub fn api_key() -> Option<String> {
        std::env::var(API_KEY_ENV_VAR)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }

    /// Joins an API path onto the configured base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn default_batch_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(MAX_BATCH_WORKERS)
}
