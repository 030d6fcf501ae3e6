// crates/careflow-core/src/load.rs

use std::fs::File;
use std::path::Path;

use mongodb::bson::{doc, Document};
use mongodb::Client;
use polars::prelude::*;
use tracing::info;

use crate::documents::dataframe_to_documents;
use crate::error::Result;

/// A single client serving both logical destinations (lake and warehouse);
/// they are separate databases behind one connection string.
pub struct DocumentStore {
    client: Client,
}

impl DocumentStore {
    pub async fn connect(uri: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri).await?;
        Ok(Self { client })
    }

    /// Full-replace write: delete every existing document, then insert the
    /// dataset's records. Not transactional; a crash between the two calls
    /// leaves the collection empty.
    pub async fn replace_collection(
        &self,
        database: &str,
        collection: &str,
        df: &DataFrame,
    ) -> Result<usize> {
        let documents = dataframe_to_documents(df)?;
        let target = self
            .client
            .database(database)
            .collection::<Document>(collection);

        target.delete_many(doc! {}).await?;
        if !documents.is_empty() {
            target.insert_many(&documents).await?;
        }

        info!(
            database,
            collection,
            rows = documents.len(),
            "replaced collection contents"
        );
        Ok(documents.len())
    }
}

/// Writes a dataset snapshot as delimited text with a header row.
pub fn write_csv_snapshot(df: &DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df.clone())?;
    Ok(())
}
