//! Error and result types shared across the catalog.
//!
use crate::model::RecordId;
use crate::validate::SignupReport;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

/// Every failure the catalog surfaces. All of them are recoverable: the TUI
/// shows them as a notice or as inline form errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A required book form field was empty after trimming.
    #[error("Please fill in all fields ({0} is missing)")]
    MissingField(&'static str),

    /// One or more signup fields failed validation.
    #[error("{0}")]
    ValidationFailed(SignupReport),

    #[error("Check the user type, password or username")]
    InvalidCredentials,

    /// The document stored under `key` could not be decoded.
    #[error("stored data under '{key}' is corrupt: {reason}")]
    CorruptPersistedData { key: String, reason: String },

    #[error("record {0} not found")]
    RecordNotFound(RecordId),

    /// A view index past the end of the rows it was taken from.
    #[error("no row {0} in the current view")]
    NoSuchRow(usize),

    /// The backend itself failed (filesystem errors for `FileStore`).
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    pub fn corrupt(key: &str, reason: impl ToString) -> Self {
        Self::CorruptPersistedData {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }
}
