//! Error types for the reqdot library.

use std::io;
use thiserror::Error;

/// Result type alias for reqdot operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or repairing a package.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error reading or writing a ZIP archive.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// Invalid or malformed data in the package.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A required package component is missing.
    #[error("Missing component: {0}")]
    MissingComponent(String),

    /// Error during text encoding conversion.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// The template configuration cannot produce a valid package.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Whether this error was caused by the OS refusing access to a path.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == io::ErrorKind::PermissionDenied)
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            // Keep the io::ErrorKind visible to callers
            zip::result::ZipError::Io(e) => Error::Io(e),
            other => Error::ZipArchive(other.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidConfig(err.to_string())
    }
}

impl From<tempfile::PersistError> for Error {
    fn from(err: tempfile::PersistError) -> Self {
        Error::Io(err.error)
    }
}
