use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::DEFAULT_DATE_FORMAT;
use crate::render::ExtensionStrip;

const WRITER_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read writer config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse writer config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Settings that shape the generated project text.
/// 影響專案檔輸出內容的設定。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriterConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_date_format")]
    pub date_format: String,
    #[serde(default)]
    pub extension_strip: ExtensionStrip,
}

fn default_version() -> u32 {
    WRITER_CONFIG_VERSION
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            version: WRITER_CONFIG_VERSION,
            date_format: default_date_format(),
            extension_strip: ExtensionStrip::default(),
        }
    }
}

impl WriterConfig {
    pub fn sanitize(&mut self) {
        if self.version == 0 {
            self.version = WRITER_CONFIG_VERSION;
        }
        if self.date_format.trim().is_empty() {
            self.date_format = default_date_format();
        }
    }
}

/// Loads [`WriterConfig`] from a JSON file.
/// 從 JSON 檔載入輸出設定。
#[derive(Debug)]
pub struct WriterConfigStore {
    path: PathBuf,
    data: WriterConfig,
}

impl WriterConfigStore {
    /// Reads the config at `path`, falling back to defaults when the file is absent.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            let mut data = WriterConfig::default();
            data.sanitize();
            return Ok(Self { path, data });
        }

        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let mut data: WriterConfig =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?;
        data.sanitize();
        Ok(Self { path, data })
    }

    pub fn config(&self) -> &WriterConfig {
        &self.data
    }

    pub fn into_config(self) -> WriterConfig {
        self.data
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
