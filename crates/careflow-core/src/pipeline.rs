// crates/careflow-core/src/pipeline.rs

use chrono::Utc;
use polars::prelude::DataFrame;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::Result;
use crate::extract;
use crate::load::{self, DocumentStore};
use crate::transform::{self, TransformOutput};

#[derive(Debug)]
pub enum RunOutcome {
    /// Extraction produced no data; the run stopped before any store
    /// connection or persistence call. This is a normal termination.
    Halted,
    Completed(RunSummary),
}

#[derive(Debug)]
pub struct RunSummary {
    pub raw_rows: usize,
    pub clean_rows: usize,
    pub summary_rows: usize,
}

/// Sequences the full batch run: setup, extract, snapshot raw, load lake,
/// transform, snapshot derived, load warehouse. Strictly sequential; every
/// stage after extraction either has its inputs present or the run has
/// already returned.
pub async fn run(config: &AppConfig) -> Result<RunOutcome> {
    setup_directories(config)?;

    let Some(raw) = extract::extract(config).await else {
        warn!("extraction produced no data; run halted");
        return Ok(RunOutcome::Halted);
    };

    snapshot_raw(config, &raw)?;

    let store = DocumentStore::connect(&config.mongo.uri).await?;
    store
        .replace_collection(
            &config.mongo.lake_db,
            &config.mongo.lake_patients_collection,
            &raw,
        )
        .await?;
    info!("raw patient data loaded into the lake");

    // One reference instant for the whole dataset, so every row's age is
    // derived against the same moment.
    let reference = Utc::now();
    let TransformOutput { clean, summary } = transform::transform(&raw, reference)?;

    load::write_csv_snapshot(&clean, &config.snapshots.clean_patients_file)?;
    load::write_csv_snapshot(&summary, &config.snapshots.department_summary_file)?;
    info!("derived datasets snapshotted");

    store
        .replace_collection(
            &config.mongo.warehouse_db,
            &config.mongo.warehouse_patients_collection,
            &clean,
        )
        .await?;
    store
        .replace_collection(
            &config.mongo.warehouse_db,
            &config.mongo.warehouse_summary_collection,
            &summary,
        )
        .await?;
    info!("derived datasets loaded into the warehouse");

    let run_summary = RunSummary {
        raw_rows: raw.height(),
        clean_rows: clean.height(),
        summary_rows: summary.height(),
    };
    info!(
        raw_rows = run_summary.raw_rows,
        clean_rows = run_summary.clean_rows,
        summary_rows = run_summary.summary_rows,
        "ETL run completed"
    );
    Ok(RunOutcome::Completed(run_summary))
}

fn setup_directories(config: &AppConfig) -> Result<()> {
    std::fs::create_dir_all(&config.snapshots.raw_data_dir)?;
    std::fs::create_dir_all(&config.snapshots.processed_data_dir)?;
    info!("snapshot directories ready");
    Ok(())
}

fn snapshot_raw(config: &AppConfig, raw: &DataFrame) -> Result<()> {
    load::write_csv_snapshot(raw, &config.snapshots.raw_patients_file)?;
    info!(path = %config.snapshots.raw_patients_file.display(), "raw dataset snapshotted");
    Ok(())
}
