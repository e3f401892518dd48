//! TOML-based application configuration.
//!
//! Stores:
//! - Active timetable versions
//! - Bell schedule (lesson start times and length)
//! - Rooms that may host several groups at once
//! - Lucky number settings
//!
//! Configuration is stored at `<data dir>/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::calendar::BellSchedule;
use crate::error::{ConfigError, Result, ValidationError};
use crate::model::ScheduleId;

/// Which timetable versions the views read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Empty means every version marked active in the database.
    #[serde(default)]
    pub versions: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BellConfig {
    /// Lesson start times, `HH:MM`.
    #[serde(default = "default_bell_starts")]
    pub starts: Vec<String>,
    #[serde(default = "default_lesson_minutes")]
    pub lesson_minutes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomsConfig {
    /// Rooms never reported as double-booked (sports hall and the like).
    #[serde(default = "default_shared_rooms")]
    pub shared: Vec<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LuckyConfig {
    /// From this hour on the next day's number is shown.
    #[serde(default = "default_change_hour")]
    pub change_hour: u32,
    /// Cycle length used when no group has members.
    #[serde(default = "default_fallback_max")]
    pub fallback_max: u16,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub bells: BellConfig,
    #[serde(default)]
    pub rooms: RoomsConfig,
    #[serde(default)]
    pub lucky: LuckyConfig,
}

// Default functions
fn default_bell_starts() -> Vec<String> {
    ["07:55", "08:55", "10:00", "10:55", "12:00", "12:55", "13:50", "14:45"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_lesson_minutes() -> u32 {
    45
}
fn default_shared_rooms() -> Vec<u16> {
    vec![100]
}
fn default_change_hour() -> u32 {
    15
}
fn default_fallback_max() -> u16 {
    36
}

impl Default for BellConfig {
    fn default() -> Self {
        Self {
            starts: default_bell_starts(),
            lesson_minutes: default_lesson_minutes(),
        }
    }
}

impl Default for RoomsConfig {
    fn default() -> Self {
        Self {
            shared: default_shared_rooms(),
        }
    }
}

impl Default for LuckyConfig {
    fn default() -> Self {
        Self {
            change_hour: default_change_hour(),
            fallback_max: default_fallback_max(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Location of `config.toml` in the data directory.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit file, writing defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("using default configuration: {e}");
            Self::default()
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        Ok(())
    }

    /// Timetable versions to read, `None` meaning the database's active ones.
    pub fn schedule_versions(&self) -> Option<Vec<ScheduleId>> {
        if self.schedule.versions.is_empty() {
            None
        } else {
            Some(self.schedule.versions.iter().copied().map(ScheduleId).collect())
        }
    }

    pub fn bell_schedule(&self) -> Result<BellSchedule, ValidationError> {
        BellSchedule::parse(&self.bells.starts, self.bells.lesson_minutes)
    }
}
