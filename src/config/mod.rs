use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::{
    errors::OpsError,
    storage::RetryPolicy,
    utils::paths::{app_data_dir, config_file_in, ensure_dir, sheets_dir_in, tmp_path},
};

/// West Africa Time, the outlet's single fixed zone.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 60;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub utc_offset_minutes: i32,
    pub cache_ttl_secs: u64,
    pub retry_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub max_rows: usize,
    pub currency_symbol: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            cache_ttl_secs: 300,
            retry_attempts: 5,
            retry_base_delay_ms: 1200,
            max_rows: 20_000,
            currency_symbol: "₦".into(),
        }
    }
}

impl Config {
    pub fn timezone(&self) -> Result<FixedOffset, OpsError> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                OpsError::Config(format!(
                    "utc_offset_minutes {} is out of range",
                    self.utc_offset_minutes
                ))
            })
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_attempts,
            Duration::from_millis(self.retry_base_delay_ms),
        )
    }
}

pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, OpsError> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, OpsError> {
        ensure_dir(&base)?;
        Ok(Self {
            path: config_file_in(&base),
            base,
        })
    }

    pub fn load(&self) -> Result<Config, OpsError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), OpsError> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Sheets directory: the configured override or `<base>/sheets`.
    pub fn sheets_dir(&self, config: &Config) -> PathBuf {
        config
            .data_dir
            .clone()
            .unwrap_or_else(|| sheets_dir_in(&self.base))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn write_atomic(path: &Path, data: &str) -> Result<(), OpsError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(manager.sheets_dir(&config), temp.path().join("sheets"));
    }

    #[test]
    fn save_then_load_keeps_overrides() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let config = Config {
            cache_ttl_secs: 30,
            retry_attempts: 2,
            ..Config::default()
        };
        manager.save(&config).unwrap();
        let loaded = manager.load().unwrap();
        assert_eq!(loaded.cache_ttl_secs, 30);
        assert_eq!(loaded.retry_attempts, 2);
        assert_eq!(loaded.currency_symbol, "₦");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{ "utc_offset_minutes": 0 }"#).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.utc_offset_minutes, 0);
        assert_eq!(config.max_rows, 20_000);
    }

    #[test]
    fn out_of_range_offset_is_a_config_error() {
        let config = Config {
            utc_offset_minutes: 24 * 60,
            ..Config::default()
        };
        assert!(matches!(config.timezone(), Err(OpsError::Config(_))));
    }

    #[test]
    fn huge_offset_is_a_config_error_not_an_overflow() {
        for minutes in [i32::MAX, i32::MIN] {
            let config = Config {
                utc_offset_minutes: minutes,
                ..Config::default()
            };
            assert!(matches!(config.timezone(), Err(OpsError::Config(_))));
        }
    }
}
