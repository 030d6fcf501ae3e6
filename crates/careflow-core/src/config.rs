// crates/careflow-core/src/config.rs

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;

/// Which source the extractor should pull the raw patient dataset from.
///
/// Any selector value other than the three known ones deserializes to
/// `Unknown`, in which case no extraction is attempted and the run halts
/// with an absent dataset rather than a hard error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    LocalCsv,
    Csv,
    Api,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    pub local_csv_path: PathBuf,
    pub csv_url: String,
    pub api_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotConfig {
    pub raw_data_dir: PathBuf,
    pub processed_data_dir: PathBuf,
    pub raw_patients_file: PathBuf,
    pub clean_patients_file: PathBuf,
    pub department_summary_file: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub lake_db: String,
    pub lake_patients_collection: String,
    pub warehouse_db: String,
    pub warehouse_patients_collection: String,
    pub warehouse_summary_collection: String,
}

/// Immutable run configuration, constructed once at process start and passed
/// by reference into every component. No component reads ambient global state.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub source: SourceKind,
    pub extract: ExtractConfig,
    pub snapshots: SnapshotConfig,
    pub mongo: MongoConfig,
}

impl AppConfig {
    /// Loads the configuration from a TOML file. The Mongo connection string
    /// may be overridden through the `CAREFLOW_MONGO_URI` environment variable
    /// so credentials stay out of the checked-in config file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: AppConfig = toml::from_str(&contents)?;
        if let Ok(uri) = std::env::var("CAREFLOW_MONGO_URI") {
            config.mongo.uri = uri;
        }
        Ok(config)
    }
}
