use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::modules::coords::PlayerCoordinates;
use crate::modules::error::ConfigError;

/// Overrides the state directory (default `.blocklog`).
pub const STATE_DIR_ENV: &str = "BLOCKLOG_HOME";
/// Overrides the database path for one invocation without persisting it.
pub const DB_PATH_ENV: &str = "BLOCKLOG_DB";

const CONFIG_FILE: &str = "config.json";
const LEGACY_COORDS_FILE: &str = "coords.json";

fn default_auto_update() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
    #[serde(default = "default_auto_update")]
    pub auto_update: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_coords: Option<PlayerCoordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: None,
            auto_update: default_auto_update(),
            player_coords: None,
            update_url: None,
        }
    }
}

/// File-backed config and coordinate state. One instance per process; it is
/// passed explicitly to whatever needs the current position.
///
/// The file is not locked: two concurrent invocations can overwrite each
/// other's changes.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
    config: Config,
    db_override: Option<PathBuf>,
}

pub fn state_dir() -> PathBuf {
    env::var_os(STATE_DIR_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".blocklog"))
}

impl ConfigStore {
    pub fn open_default() -> Result<Self, ConfigError> {
        let mut store = Self::open(state_dir())?;
        store.db_override = env::var_os(DB_PATH_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Ok(store)
    }

    /// Loads `config.json` from `dir`, falling back to defaults when it is
    /// missing or empty. A legacy `coords.json` is imported when the config
    /// carries no coordinates.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let dir = dir.into();
        let path = dir.join(CONFIG_FILE);
        let mut config = read_json::<Config>(&path)?.unwrap_or_default();

        if config.player_coords.is_none() {
            let legacy = dir.join(LEGACY_COORDS_FILE);
            if let Some(coords) = read_json::<PlayerCoordinates>(&legacy)? {
                debug!(path = %legacy.display(), "imported legacy coordinates");
                config.player_coords = Some(coords);
            }
        }

        Ok(Self {
            dir,
            config,
            db_override: None,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state_dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_override
            .as_deref()
            .or(self.config.db_path.as_deref())
    }

    pub fn coordinates(&self) -> PlayerCoordinates {
        self.config.player_coords.unwrap_or_default()
    }

    /// Replaces the in-memory position and persists it. On a write failure the
    /// new position stays in effect for the rest of the process.
    pub fn save_coordinates(&mut self, coords: PlayerCoordinates) -> Result<(), ConfigError> {
        self.config.player_coords = Some(coords);
        self.save()?;
        info!(x = coords.x, y = coords.y, z = coords.z, world = ?coords.world_id, "saved coordinates");
        Ok(())
    }

    pub fn set_db_path(&mut self, path: impl Into<PathBuf>) -> Result<(), ConfigError> {
        let path = path.into();
        validate_db_path(&path)?;
        self.config.db_path = Some(path);
        self.db_override = None;
        self.save()
    }

    pub fn set_auto_update(&mut self, enabled: bool) -> Result<(), ConfigError> {
        self.config.auto_update = enabled;
        self.save()
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = self.path();
        fs::create_dir_all(&self.dir).map_err(|source| ConfigError::Write {
            path: path.clone(),
            source,
        })?;
        let json = serde_json::to_vec_pretty(&self.config).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(|source| ConfigError::Write { path, source })?;
        Ok(())
    }
}

/// A database path is acceptable when its parent directory exists. The file
/// itself may not exist yet.
pub fn validate_db_path(path: &Path) -> Result<(), ConfigError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            Err(ConfigError::MissingDirectory(parent.to_path_buf()))
        }
        _ => Ok(()),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let bytes = fs::read(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let value = serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(value))
}
