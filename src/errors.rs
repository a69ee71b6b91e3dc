//! Typed error hierarchy for the reviews service.
//!
//! `ReviewError` is what resolvers and store adapters hand back to the
//! transport layer. Lower layers use `anyhow` with context and are wrapped
//! into `Database` at the store seam.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Invalid argument '{argument}': {message}")]
    InvalidArgument { argument: String, message: String },

    #[error("Database error: {0}")]
    Database(#[source] anyhow::Error),
}

impl ReviewError {
    pub fn invalid_argument(argument: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            message: message.into(),
        }
    }
}

pub type ReviewResult<T> = std::result::Result<T, ReviewError>;
