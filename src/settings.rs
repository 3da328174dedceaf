use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::db::DB_FILE;
use crate::error::{FinrepError, Result};
use crate::ingest::EntityScope;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    #[serde(default, deserialize_with = "lenient_scope")]
    pub entity_scope: EntityScope,
}

/// An unrecognized scope falls back to the default instead of failing the
/// whole settings file.
fn lenient_scope<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<EntityScope, D::Error> {
    let raw = serde_json::Value::deserialize(d)?;
    match raw.as_str().and_then(EntityScope::from_key) {
        Some(scope) => Ok(scope),
        None => {
            warn!(value = %raw, "unknown entity_scope in settings, using default");
            Ok(EntityScope::default())
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            entity_scope: EntityScope::default(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("finrep")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("finrep")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if !path.exists() {
        return Settings::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(content) => parse_settings(&content),
        Err(e) => {
            warn!(path = %path.display(), "could not read settings, using defaults: {e}");
            Settings::default()
        }
    }
}

fn parse_settings(content: &str) -> Settings {
    serde_json::from_str(content).unwrap_or_else(|e| {
        warn!("could not parse settings, using defaults: {e}");
        Settings::default()
    })
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| FinrepError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn get_data_dir() -> PathBuf {
    PathBuf::from(&load_settings().data_dir)
}

pub fn get_db_path() -> PathBuf {
    get_data_dir().join(DB_FILE)
}

pub fn uploads_dir(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join("uploads")
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}
