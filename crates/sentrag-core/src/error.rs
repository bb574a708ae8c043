use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unsupported filetype: {extension} ({})", .path.display())]
    UnsupportedFileType { path: PathBuf, extension: String },
}

pub type Result<T> = std::result::Result<T, Error>;
