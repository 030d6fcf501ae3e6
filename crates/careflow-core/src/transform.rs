// crates/careflow-core/src/transform.rs

use chrono::{DateTime, NaiveDate, Utc};
use polars::prelude::*;
use tracing::info;

use crate::error::{PipelineError, Result};

/// Columns the transform stage cannot run without. A raw dataset missing any
/// of these is a fatal configuration error for the run, not a recoverable one.
pub const REQUIRED_COLUMNS: [&str; 4] = ["patient_id", "department", "dob", "billing_amount"];

/// The two derived datasets produced from one raw patient dataset.
#[derive(Debug)]
pub struct TransformOutput {
    pub clean: DataFrame,
    pub summary: DataFrame,
}

/// Derives the cleaned patient dataset and the department summary.
///
/// The caller is responsible for the absent-data short circuit; this function
/// assumes a present dataset. The reference instant is an explicit input,
/// captured once per run by the orchestrator, so age derivation uses an
/// identical instant for every row and is reproducible in tests.
pub fn transform(raw: &DataFrame, reference: DateTime<Utc>) -> Result<TransformOutput> {
    ensure_required_columns(raw)?;

    let clean = derive_clean_patients(raw, reference)?;
    info!(rows = clean.height(), "derived cleaned patient dataset");

    let summary = summarize_departments(&clean)?;
    info!(departments = summary.height(), "derived department summary");

    Ok(TransformOutput { clean, summary })
}

fn ensure_required_columns(df: &DataFrame) -> Result<()> {
    let names = df.get_column_names();
    for required in REQUIRED_COLUMNS {
        if !names.iter().any(|name| name.as_str() == required) {
            return Err(PipelineError::Schema(format!(
                "raw patient dataset is missing required column '{required}'"
            )));
        }
    }
    Ok(())
}

/// Age enrichment and group-wise billing imputation.
///
/// Row count, ordering and department membership are unchanged; passthrough
/// columns are carried as-is.
fn derive_clean_patients(raw: &DataFrame, reference: DateTime<Utc>) -> Result<DataFrame> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    let reference_days = (reference.date_naive() - epoch).num_days() as i32;

    // Unparseable or missing dob values become null dates, not errors.
    let parse_dob = col("dob")
        .cast(DataType::String)
        .str()
        .to_date(StrptimeOptions {
            format: Some("%Y-%m-%d".into()),
            strict: false,
            ..Default::default()
        })
        .alias("dob");

    // Date columns are physically days since the Unix epoch, so the day span
    // is a plain integer subtraction. age = floor(days / 365.25), with a null
    // dob defaulting to exactly 0.
    let age = ((lit(reference_days) - col("dob").cast(DataType::Int32)).cast(DataType::Float64)
        / lit(365.25f64))
    .floor()
    .cast(DataType::Int64)
    .fill_null(lit(0i64))
    .alias("age");

    // The window mean is computed over the pre-fill column, so filled values
    // never contaminate the imputation basis. A department with zero non-null
    // billing values has an undefined mean and the fill is a no-op.
    let impute_billing = col("billing_amount")
        .cast(DataType::Float64)
        .fill_null(
            col("billing_amount")
                .cast(DataType::Float64)
                .mean()
                .over([col("department")]),
        )
        .alias("billing_amount");

    let mut clean = raw
        .clone()
        .lazy()
        .with_column(parse_dob)
        .with_column(age)
        .with_column(impute_billing)
        .collect()?;

    round_column(&mut clean, "billing_amount")?;
    Ok(clean)
}

/// One summary row per distinct department, sorted by department name so the
/// output order is deterministic for a fixed input.
fn summarize_departments(clean: &DataFrame) -> Result<DataFrame> {
    let mut summary = clean
        .clone()
        .lazy()
        .group_by([col("department")])
        .agg([
            len().cast(DataType::Int64).alias("number_of_patients"),
            col("billing_amount").sum().alias("total_revenue"),
            col("billing_amount").mean().alias("average_billing"),
        ])
        .sort(["department"], SortMultipleOptions::default())
        .collect()?;

    // The mean of an all-null department is undefined and stays null here;
    // downstream consumers see a null average_billing, never a fabricated 0.
    round_column(&mut summary, "average_billing")?;
    Ok(summary)
}

/// Rounds a nullable float column to two decimals, half away from zero
/// (`f64::round` semantics). Nulls are preserved.
fn round_column(df: &mut DataFrame, name: &str) -> Result<()> {
    let values = df.column(name)?.f64()?;
    let rounded: Vec<Option<f64>> = values.into_iter().map(|opt| opt.map(round_to_cents)).collect();
    df.with_column(Series::new(name.into(), rounded))?;
    Ok(())
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
