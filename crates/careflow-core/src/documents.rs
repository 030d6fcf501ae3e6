// crates/careflow-core/src/documents.rs

use chrono::NaiveDate;
use mongodb::bson::{Bson, Document};
use polars::prelude::*;

use crate::error::{PipelineError, Result};

/// Converts a dataset into one BSON document per row, keyed by column name.
///
/// Only the dtypes a patient dataset can legitimately contain are mapped; any
/// other dtype is a schema error rather than a silently passed-through value.
pub fn dataframe_to_documents(df: &DataFrame) -> Result<Vec<Document>> {
    let mut documents = vec![Document::new(); df.height()];

    for column in df.get_columns() {
        let name = column.name().as_str();
        let series = column.as_materialized_series();
        for (document, value) in documents.iter_mut().zip(series.iter()) {
            document.insert(name, anyvalue_to_bson(name, value)?);
        }
    }

    Ok(documents)
}

fn anyvalue_to_bson(column: &str, value: AnyValue<'_>) -> Result<Bson> {
    let bson = match value {
        AnyValue::Null => Bson::Null,
        AnyValue::Boolean(v) => Bson::Boolean(v),
        AnyValue::Int8(v) => Bson::Int32(i32::from(v)),
        AnyValue::Int16(v) => Bson::Int32(i32::from(v)),
        AnyValue::Int32(v) => Bson::Int32(v),
        AnyValue::Int64(v) => Bson::Int64(v),
        AnyValue::UInt8(v) => Bson::Int32(i32::from(v)),
        AnyValue::UInt16(v) => Bson::Int32(i32::from(v)),
        AnyValue::UInt32(v) => Bson::Int64(i64::from(v)),
        AnyValue::UInt64(v) => Bson::Int64(v as i64),
        AnyValue::Float32(v) => Bson::Double(f64::from(v)),
        AnyValue::Float64(v) => Bson::Double(v),
        AnyValue::String(v) => Bson::String(v.to_string()),
        AnyValue::StringOwned(v) => Bson::String(v.to_string()),
        AnyValue::Date(days) => Bson::String(date_from_epoch_days(days).to_string()),
        other => {
            return Err(PipelineError::Schema(format!(
                "column '{column}' holds unsupported value {other:?} for document serialization"
            )))
        }
    };
    Ok(bson)
}

fn date_from_epoch_days(days: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap() + chrono::Duration::days(i64::from(days))
}
