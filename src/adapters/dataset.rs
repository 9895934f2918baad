use crate::domain::model::PropertyRecord;
use crate::domain::ports::{DatasetSource, Storage};
use crate::utils::error::Result;

/// Reference dataset backed by a CSV file. The file is read and parsed on
/// every call, so edits to it are picked up without a restart.
#[derive(Debug, Clone)]
pub struct CsvDataset<S: Storage> {
    storage: S,
    path: String,
}

impl<S: Storage> CsvDataset<S> {
    pub fn new(storage: S, path: impl Into<String>) -> Self {
        Self {
            storage,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

pub fn parse_records(data: &[u8]) -> Result<Vec<PropertyRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(data);

    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: PropertyRecord = row?;
        records.push(record);
    }
    Ok(records)
}

impl<S: Storage> DatasetSource for CsvDataset<S> {
    async fn load_records(&self) -> Result<Vec<PropertyRecord>> {
        let data = self.storage.read_file(&self.path).await?;
        let records = parse_records(&data)?;
        tracing::debug!("Loaded {} reference records from {}", records.len(), self.path);
        Ok(records)
    }
}
