use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommonsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Zip operation failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Path does not exist: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("File name '{name}' has {found} parts, expected at least {wanted}")]
    FilenameParts {
        name: String,
        wanted: usize,
        found: usize,
    },

    #[error("Path has no file name: {}", path.display())]
    NoFileName { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, CommonsError>;
