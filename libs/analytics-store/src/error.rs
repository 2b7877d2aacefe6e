use std::fmt::Debug;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid value for `{key}`: `{value}`")]
    InvalidSetting { key: String, value: String },

    #[error("Snapshot I/O error: {0}")]
    SnapshotIo(#[from] std::io::Error),

    #[error("Snapshot encoding error: {0}")]
    SnapshotEncoding(#[from] serde_json::Error),
}
