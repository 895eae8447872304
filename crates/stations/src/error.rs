use std::error::Error;

use thiserror::Error;

use crate::database::DatabaseError;

#[derive(Debug, Error)]
pub enum StationError {
    /// Malformed or missing input. The message is meant for the caller.
    #[error("{0}")]
    Validation(String),

    #[error("station not found")]
    NotFound,

    #[error("a station with this name and location already exists")]
    Conflict,

    #[error("internal error: {0}")]
    Internal(#[source] Box<dyn Error + Send + Sync>),
}

impl StationError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<DatabaseError> for StationError {
    fn from(value: DatabaseError) -> Self {
        match value {
            DatabaseError::NotFound => Self::NotFound,
            DatabaseError::Duplicate => Self::Conflict,
            DatabaseError::Other(why) => Self::Internal(why),
        }
    }
}

pub type StationResult<O> = Result<O, StationError>;
