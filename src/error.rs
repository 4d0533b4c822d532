//! Generator errors

use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no matching schedule after {attempts} attempts")]
    AttemptsExhausted { attempts: u32 },

    #[error("invalid time string {value:?}, expected H:MM:SS")]
    InvalidTime { value: String },

    #[error("line {line}: {message}")]
    OpenMatb { line: usize, message: String },

    #[error("{}: {source}", .path.display())]
    Wav {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("{}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{}: {detail}", .path.display())]
    Media { path: PathBuf, detail: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub fn media(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        Error::Media {
            path: path.into(),
            detail: detail.into(),
        }
    }
}
