// crates/careflow-core/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Document store operation failed: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration file could not be parsed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Dataset schema error: {0}")]
    Schema(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
