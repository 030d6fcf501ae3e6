// crates/careflow-core/src/extract.rs

use std::io::Cursor;
use std::path::Path;

use polars::prelude::*;
use tracing::{info, warn};

use crate::config::{AppConfig, SourceKind};
use crate::error::{PipelineError, Result};

/// Extracts the raw patient dataset from the configured source.
///
/// Extraction is the only recoverable stage of the run: every failure here
/// (missing file, network error, non-2xx status, malformed body) is caught,
/// logged, and downgraded to `None` so the orchestrator can halt cleanly
/// before any persistence happens. This function never returns an error.
pub async fn extract(config: &AppConfig) -> Option<DataFrame> {
    let attempted = match config.source {
        SourceKind::LocalCsv => {
            info!(path = %config.extract.local_csv_path.display(), "extracting from local CSV");
            read_local_csv(&config.extract.local_csv_path)
        }
        SourceKind::Csv => {
            info!(url = %config.extract.csv_url, "extracting from remote CSV");
            fetch_remote_csv(&config.extract.csv_url).await
        }
        SourceKind::Api => {
            info!(url = %config.extract.api_url, "extracting from JSON API");
            fetch_api(&config.extract.api_url).await
        }
        SourceKind::Unknown => {
            warn!("unknown source selector; no extraction attempted");
            return None;
        }
    };

    match attempted {
        Ok(df) => {
            info!(rows = df.height(), "extracted raw patient dataset");
            Some(df)
        }
        Err(err) => {
            warn!(error = %err, "extraction failed; continuing with no data");
            None
        }
    }
}

fn read_local_csv(path: &Path) -> Result<DataFrame> {
    let contents = std::fs::read(path)?;
    csv_bytes_to_dataframe(contents)
}

async fn fetch_remote_csv(url: &str) -> Result<DataFrame> {
    let response = reqwest::get(url).await?.error_for_status()?;
    let bytes = response.bytes().await?;
    csv_bytes_to_dataframe(bytes.to_vec())
}

/// The API source returns a JSON array of patient record objects.
async fn fetch_api(url: &str) -> Result<DataFrame> {
    let response = reqwest::get(url).await?.error_for_status()?;
    let bytes = response.bytes().await?;
    json_records_to_dataframe(&bytes)
}

/// Parses an API response body as a JSON array of record objects.
///
/// The body is validated through serde_json first, so a malformed body or a
/// non-array payload surfaces as a typed error instead of whatever the
/// DataFrame reader would make of it.
pub fn json_records_to_dataframe(bytes: &[u8]) -> Result<DataFrame> {
    let payload: serde_json::Value = serde_json::from_slice(bytes)?;
    if !payload.is_array() {
        return Err(PipelineError::Schema(
            "API response is not a JSON array of records".to_string(),
        ));
    }

    let cursor = Cursor::new(bytes);
    let df = JsonReader::new(cursor)
        .with_json_format(JsonFormat::Json)
        .finish()?;
    Ok(df)
}

fn csv_bytes_to_dataframe(bytes: Vec<u8>) -> Result<DataFrame> {
    let cursor = Cursor::new(bytes);
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .into_reader_with_file_handle(cursor)
        .finish()?;
    Ok(df)
}
