use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use crate::{errors::StoreError, models::SaleRecord, traits::SaleSource};
use anyhow::Result;
use tracing::debug;

/// Sales store kept as a JSON array on disk.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parses a JSON array of sale records from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<SaleRecord>, StoreError> {
        Ok(serde_json::from_reader(reader)?)
    }
}

impl SaleSource for JsonFileStore {
    fn load(&self) -> Result<Vec<SaleRecord>> {
        let file = File::open(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;
        let records = Self::from_reader(BufReader::new(file))?;

        debug!(path = %self.path.display(), records = records.len(), "loaded sales store");
        Ok(records)
    }
}
