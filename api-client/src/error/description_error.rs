//! API description resolution errors.

use thiserror::Error;

/// Errors raised when a client's API description cannot be used.
///
/// The two variants keep "nothing supplied" apart from "something supplied
/// but unusable", and their messages say so.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DescriptionError {
    /// No description reference was configured.
    #[error("No API service description found")]
    NotFound,

    /// A description reference was configured but could not be resolved or loaded.
    #[error("Malformed API service description: {reason}")]
    Malformed {
        /// What made the description unusable.
        reason: String,
    },
}

impl DescriptionError {
    /// Creates a malformed description error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}
