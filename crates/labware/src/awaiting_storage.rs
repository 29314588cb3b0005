//! The hand-over of labware from the end of one workflow to the start of the storage workflow.
//!
//! The list travels through browser-style session storage as a JSON array of barcodes.

use thiserror::Error;

use crate::barcode::Barcode;

pub const AWAITING_STORAGE_KEY: &str = "awaitingStorage";

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct AwaitingStorage(pub Vec<Barcode>);

impl AwaitingStorage {
    pub fn new(barcodes: impl IntoIterator<Item = Barcode>) -> Self {
        let mut list = Self::default();
        for barcode in barcodes {
            list.push(barcode);
        }
        list
    }

    /// Adds a barcode, ignoring duplicates.
    pub fn push(&mut self, barcode: Barcode) {
        if !self.0.contains(&barcode) {
            self.0.push(barcode);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn encode(&self) -> Result<String, AwaitingStorageError> {
        serde_json::to_string(self).map_err(|e| AwaitingStorageError::Encoding(e.to_string()))
    }

    /// An absent value decodes to an empty list.
    pub fn decode(value: Option<&str>) -> Result<Self, AwaitingStorageError> {
        match value {
            None => Ok(Self::default()),
            Some(value) => serde_json::from_str(value).map_err(|e| AwaitingStorageError::Decoding(e.to_string())),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AwaitingStorageError {
    #[error("Unable to encode labware awaiting storage. cause: {0}")]
    Encoding(String),
    #[error("Unable to read labware awaiting storage. cause: {0}")]
    Decoding(String),
}
