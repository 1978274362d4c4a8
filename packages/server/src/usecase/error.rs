//! UseCase error types.

use thiserror::Error;

use crate::domain::{RepositoryError, ValidationError};

/// Errors reported back to the client that issued the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("channel_id is required")]
    MissingChannelId,

    #[error("invalid channel_id: {0}")]
    InvalidChannelId(ValidationError),

    #[error("content is required")]
    MissingContent,

    /// The connection is not (or no longer) tracked by the relay
    #[error("unknown connection '{0}'")]
    UnknownConnection(String),

    /// An identifier could not be generated
    #[error("failed to generate identifier: {0}")]
    IdGeneration(ValidationError),
}

impl From<RepositoryError> for RelayError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::ConnectionNotFound(id) => Self::UnknownConnection(id),
        }
    }
}
