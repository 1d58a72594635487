use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{
    fs::{read_to_string, write},
    path::{Path, PathBuf},
};

use crate::error::PubNetError;

/// On-disk format for node and edge files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    /// Tab-separated text, easy to edit by hand or with outside tooling.
    #[default]
    Tsv,
    /// Whole-set JSON documents, faster to load for larger data.
    Json,
}

impl FileFormat {
    pub fn ext(&self) -> &'static str {
        match self {
            FileFormat::Tsv => "tsv",
            FileFormat::Json => "json",
        }
    }

    pub fn from_ext(ext: &str) -> Option<FileFormat> {
        match ext {
            "tsv" => Some(FileFormat::Tsv),
            "json" => Some(FileFormat::Json),
            _ => None,
        }
    }
}

/// When several files exist for the same set, the machine-oriented format
/// wins.
pub const FORMAT_PREFERENCE: [FileFormat; 2] = [FileFormat::Json, FileFormat::Tsv];

/// Where and how graphs are stored. An explicit value is handed to
/// [crate::storage::load_graph] / [crate::storage::save_graph]; nothing is
/// read from process-wide state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    #[serde(default)]
    pub format: FileFormat,
}

impl StorageConfig {
    pub fn new<P: Into<PathBuf>>(data_dir: P) -> Self {
        StorageConfig {
            data_dir: data_dir.into(),
            format: FileFormat::default(),
        }
    }

    pub fn with_format(mut self, format: FileFormat) -> Self {
        self.format = format;
        self
    }

    /// The directory holding one named graph's node and edge files.
    pub fn graph_dir(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    /// Read a config from a TOML file with a `[storage]` table.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PubNetError> {
        tracing::debug!("Attempting to read storage config from: {:?}", path.as_ref());
        let content = read_to_string(path.as_ref())?;
        let config: BTreeMap<String, StorageConfig> = toml::from_str(&content)?;
        config
            .get("storage")
            .cloned()
            .ok_or_else(|| PubNetError::NotFound("storage table not found in config".to_string()))
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), PubNetError> {
        tracing::debug!("Attempting to write storage config to: {:?}", path.as_ref());
        let mut config = BTreeMap::new();
        config.insert("storage".to_string(), self.clone());
        let toml_string = toml::to_string(&config)?;
        write(path, toml_string)?;
        Ok(())
    }
}
