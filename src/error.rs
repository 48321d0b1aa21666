//! Failure kinds of a dashboard render cycle
//!
//! Every variant is fatal to the render cycle that produced it, and none of
//! them is worth retrying since all inputs are static files. Note that an
//! empty user selection is not an error, see
//! [`Transformed::Empty`](crate::transform::Transformed::Empty).

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, selecting or transforming data
#[derive(Debug, Error)]
pub enum DashboardError {
    /// An input file does not exist
    #[error("data file not found: {}", path.display())]
    DataNotFound { path: PathBuf },

    /// An input file exists, but its contents are not what we expect
    #[error("malformed data in {}: {reason}", path.display())]
    DataFormat { path: PathBuf, reason: String },

    /// The same (language, subtopic) pair appears more than once
    #[error("duplicate record for language {language_code:?} and subtopic {subtopic:?}")]
    DuplicateKey {
        language_code: Box<str>,
        subtopic: Box<str>,
    },

    /// A selector was given a value that it does not know about
    #[error("invalid {selector} option {value:?}, expected one of: {expected}")]
    InvalidOption {
        selector: &'static str,
        value: String,
        expected: String,
    },

    /// Other I/O failure while reading an input file
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
//
impl DashboardError {
    /// Classify an I/O error that occured while accessing `path`
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::DataNotFound { path }
        } else {
            Self::Io { path, source }
        }
    }

    /// Report malformed data
    pub fn format(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::DataFormat {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
