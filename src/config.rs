// SPDX-License-Identifier: MIT
//!
//! Configuration, read from legend-translate.toml or ~/.legend-translate.toml
//!

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Environment variable which overrides `api_key`
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

const CONFIG_FILE: &str = "legend-translate.toml";

#[derive(serde::Deserialize, serde::Serialize, Clone, Debug)]
#[serde(default, rename_all = "snake_case")]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    /// NB Legend workbook, columns "English" and "French"
    pub glossary: PathBuf,
    pub upload_dir: PathBuf,
    pub output_dir: PathBuf,
    pub on_row_error: RowFailurePolicy,
    /// Uploads larger than this are rejected with 413
    pub max_upload_bytes: usize,
}

/// What to do when the translation of a single row fails
#[derive(serde::Deserialize, serde::Serialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RowFailurePolicy {
    /// Abort the whole run, no output file is written
    #[default]
    Abort,
    /// Write an error marker into the row and go on
    Mark,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4o".to_string(),
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            glossary: PathBuf::from("NB Legend.xlsx"),
            upload_dir: PathBuf::from("uploads"),
            output_dir: PathBuf::from("outputs"),
            on_row_error: RowFailurePolicy::Abort,
            max_upload_bytes: 32 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Search default config files, fall back to built-in defaults
    pub fn new() -> Result<Self> {
        let config_files = [
            PathBuf::new().join(CONFIG_FILE),
            dirs::home_dir()
                .unwrap_or_default()
                .join(format!(".{}", CONFIG_FILE)),
        ];

        for config_file in config_files {
            match Self::read_file(&config_file) {
                Ok(conf) => {
                    log::debug!("Read config file {:?}", config_file);
                    return Ok(conf.with_env());
                }
                Err(Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                    log::debug!("Config file {:?} NOT found.", &config_file);
                }
                Err(err) => {
                    // Other err, stop searching
                    log::error!("Can not parse config file {:?} : {}", &config_file, err);
                    return Err(err);
                }
            }
        }

        log::debug!("No config file, use defaults");
        Ok(Self::default().with_env())
    }

    /// Config from specific file
    pub fn with_config<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        Ok(Self::read_file(config_path)?.with_env())
    }

    fn read_file<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let text = std::fs::read_to_string(config_path)?;
        toml::from_str(&text).map_err(|e| Error::Config(e.to_string()))
    }

    fn with_env(self) -> Self {
        self.with_api_key(std::env::var(API_KEY_ENV).ok())
    }

    /// Replace api_key when `key` is given and not blank
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        self
    }

    /// API key, or error when it is not configured
    pub fn api_key(&self) -> Result<&str> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(Error::Config(format!(
                "API key is not set, set {} or api_key in {}",
                API_KEY_ENV, CONFIG_FILE
            ))),
        }
    }
}
