use crate::models::BlockId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegionError {
    #[error("Block {id} is already part of this region")]
    DuplicateId { id: BlockId },
    #[error("Block {id} not found in region")]
    NotFound { id: BlockId },
    #[error("Region '{key}' not found")]
    RegionNotFound { key: String },
    #[error("Region key '{key}' is used by more than one region in this document")]
    DuplicateKey { key: String },
}

impl RegionError {
    /// Text shown in place of a region that could not be created.
    ///
    /// Only duplicate keys are reported to the reader; every other variant is a
    /// caller bug and gets its `Display` form.
    pub fn user_message(&self) -> String {
        match self {
            RegionError::DuplicateKey { key } if key.is_empty() => {
                "Found multiple regions with empty IDs. Please set a unique ID after each start tag.\n\
                 EG: '=== multi-column-start: randomID'\n\
                 Or use 'Fix Missing IDs' and reload the document."
                    .to_string()
            }
            RegionError::DuplicateKey { .. } => {
                "Region ID already exists in document, please set a unique ID.\n\
                 EG: '=== multi-column-start: randomID'"
                    .to_string()
            }
            other => other.to_string(),
        }
    }
}
