//! # Configuration
//!
//! Workspace settings live in `config.json` next to the session file. A missing
//! file means defaults; unknown fields in the file are ignored, unknown keys
//! passed to [`DocketConfig::set`] are rejected.
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `batch-size` | `5` | Texts sent to the classifier per call |
//! | `code-width` | `3` | Zero-padding of sequence numbers in codes |
//! | `max-files` | `150` | Files accepted per intake call |
//! | `max-batch-mb` | `150` | Total size accepted per intake call |
//! | `separator` | ` → ` | Breadcrumb separator |

use crate::assign::DEFAULT_CODE_WIDTH;
use crate::codec::DEFAULT_SEPARATOR;
use crate::error::{DocketError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";

pub const KEYS: &[&str] = &[
    "batch-size",
    "code-width",
    "max-files",
    "max-batch-mb",
    "separator",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocketConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_code_width")]
    pub code_width: usize,
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    #[serde(default = "default_max_batch_mb")]
    pub max_batch_mb: u64,
    #[serde(default = "default_separator")]
    pub separator: String,
}

fn default_batch_size() -> usize {
    5
}

fn default_code_width() -> usize {
    DEFAULT_CODE_WIDTH
}

fn default_max_files() -> usize {
    150
}

fn default_max_batch_mb() -> u64 {
    150
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

impl Default for DocketConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            code_width: default_code_width(),
            max_files: default_max_files(),
            max_batch_mb: default_max_batch_mb(),
            separator: default_separator(),
        }
    }
}

impl DocketConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let path = dir.as_ref().join(CONFIG_FILENAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path).map_err(DocketError::Io)?;
        let config: DocketConfig =
            serde_json::from_str(&content).map_err(DocketError::Serialization)?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(DocketError::Io)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(DocketError::Serialization)?;
        fs::write(dir.join(CONFIG_FILENAME), content).map_err(DocketError::Io)?;
        Ok(())
    }

    /// Upper bound on the total bytes of one intake call.
    pub fn max_batch_bytes(&self) -> u64 {
        self.max_batch_mb.saturating_mul(1024 * 1024)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "batch-size" => Some(self.batch_size.to_string()),
            "code-width" => Some(self.code_width.to_string()),
            "max-files" => Some(self.max_files.to_string()),
            "max-batch-mb" => Some(self.max_batch_mb.to_string()),
            "separator" => Some(self.separator.clone()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), String> {
        match key {
            "batch-size" => self.batch_size = parse_positive(key, value)?,
            "code-width" => self.code_width = parse_positive(key, value)?,
            "max-files" => self.max_files = parse_positive(key, value)?,
            "max-batch-mb" => self.max_batch_mb = parse_positive::<u64>(key, value)?,
            "separator" => {
                if value.is_empty() {
                    return Err("separator cannot be empty".to_string());
                }
                self.separator = value.to_string();
            }
            _ => return Err(format!("Unknown config key: {}", key)),
        }
        Ok(())
    }
}

fn parse_positive<T>(key: &str, value: &str) -> std::result::Result<T, String>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match value.trim().parse::<T>() {
        Ok(n) if n > T::default() => Ok(n),
        _ => Err(format!("{} expects a positive integer, got '{}'", key, value)),
    }
}
