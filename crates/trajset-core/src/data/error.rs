use crate::core::store::StoreError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Unknown element symbol '{symbol}' in molecule '{molecule}'")]
    UnknownElement { molecule: String, symbol: String },

    #[error("Shape mismatch in molecule '{molecule}': {detail}")]
    ShapeMismatch { molecule: String, detail: String },

    #[error("Unit or shape mismatch in '{group}': {detail}")]
    UnitOrShapeMismatch { group: String, detail: String },

    #[error(
        "Flat index holds {actual} entries but the qualification scan counted {expected}; the two phases disagree about qualification or striding"
    )]
    IndexCountMismatch { expected: usize, actual: usize },

    #[error("Index {index} out of range for dataset of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Expected archive missing at '{path}'", path = path.display())]
    MissingArchive { path: PathBuf },

    #[error(transparent)]
    Store(#[from] StoreError),
}
