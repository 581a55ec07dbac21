use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{
    errors::BudgetError,
    utils::{app_data_dir, config_file_in, data_dir_in, ensure_dir},
};

const TMP_SUFFIX: &str = "tmp";

pub const DEFAULT_BACKEND_URL: &str = "https://couple-budget.supabase.co";
pub const DEFAULT_ANON_KEY: &str = "public-anon-key";
pub const DEFAULT_BUCKET: &str = "receipts";
pub const DEFAULT_EXPENSES_TABLE: &str = "expenses";
pub const DEFAULT_GUESTS_TABLE: &str = "guests";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Which persistence backend the application talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Rest,
    Json,
}

/// Connection parameters for the hosted backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestSettings {
    pub url: String,
    pub anon_key: String,
    pub bucket: String,
    pub expenses_table: String,
    pub guests_table: String,
    pub timeout_secs: u64,
}

impl Default for RestSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_BACKEND_URL.into(),
            anon_key: DEFAULT_ANON_KEY.into(),
            bucket: DEFAULT_BUCKET.into(),
            expenses_table: DEFAULT_EXPENSES_TABLE.into(),
            guests_table: DEFAULT_GUESTS_TABLE.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendKind,
    pub rest: RestSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub currency_locale: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            rest: RestSettings::default(),
            data_dir: None,
            currency_locale: "pt-BR".into(),
        }
    }
}

/// Loads and saves `config.json` in the application data directory.
pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, BudgetError> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, BudgetError> {
        ensure_dir(&base)?;
        Ok(Self {
            path: config_file_in(&base),
            base,
        })
    }

    /// Missing file yields the embedded defaults.
    pub fn load(&self) -> Result<Config, BudgetError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            let config: Config = serde_json::from_str(&data)
                .map_err(|e| BudgetError::Config(format!("{}: {e}", self.path.display())))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), BudgetError> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Local store directory: configured value, else `<base>/data`.
    pub fn data_dir(&self, config: &Config) -> PathBuf {
        config
            .data_dir
            .clone()
            .unwrap_or_else(|| data_dir_in(&self.base))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), BudgetError> {
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
    fn missing_file_gives_embedded_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.backend, BackendKind::Rest);
        assert_eq!(config.rest.bucket, "receipts");
        assert_eq!(manager.data_dir(&config), temp.path().join("data"));
    }

    #[test]
    fn save_and_reload() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let mut config = Config::default();
        config.backend = BackendKind::Json;
        config.rest.timeout_secs = 5;
        manager.save(&config).unwrap();
        assert_eq!(manager.load().unwrap(), config);
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{ "backend": "json" }"#).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.backend, BackendKind::Json);
        assert_eq!(config.rest, RestSettings::default());
    }

    #[test]
    fn malformed_files_are_config_errors() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        fs::write(manager.path(), "{ not json").unwrap();
        assert!(matches!(manager.load(), Err(BudgetError::Config(_))));
    }
}
