use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use context_logging::{ctx_info, ctx_warn};
use thiserror::Error;
use tool3rd_protocol::Settings;
use tool3rd_worker::{write_atomically, PersistError};

pub const SETTINGS_FILENAME: &str = "settings.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write settings: {0}")]
    Persist(#[from] PersistError),
}

/// `settings.json` in the user-data directory.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(user_data: &Path) -> Self {
        Self {
            path: user_data.join(SETTINGS_FILENAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the settings, writing the defaults on first run. A file that no
    /// longer parses is replaced by the defaults.
    pub fn load(&self) -> Result<Settings, SettingsError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                ctx_info!("creating default settings at {:?}", self.path);
                let defaults = Settings::default();
                self.save(&defaults)?;
                return Ok(defaults);
            }
            Err(err) => return Err(err.into()),
        };

        match serde_json::from_str(&text) {
            Ok(settings) => Ok(settings),
            Err(err) => {
                ctx_warn!("settings at {:?} are unreadable, resetting: {}", self.path, err);
                let defaults = Settings::default();
                self.save(&defaults)?;
                Ok(defaults)
            }
        }
    }

    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let text = serde_json::to_string_pretty(settings)?;
        write_atomically(&self.path, text.as_bytes())?;
        Ok(())
    }
}
