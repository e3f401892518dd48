mod config;
pub mod database;
pub mod migrations;

pub use config::{BellConfig, Config, LuckyConfig, RoomsConfig, ScheduleConfig};
pub use database::Database;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it when missing.
///
/// `$SIS_DATA_DIR` wins when set. Otherwise `~/.config/sis/`, or
/// `~/.config/sis-dev/` with `SIS_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("SIS_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("SIS_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("sis-dev")
            } else {
                base_dir.join("sis")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
