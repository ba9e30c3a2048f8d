use thiserror::Error;

use crate::services::directory::DirectoryError;
use crate::services::google::ProviderError;

/// Flattened user-facing message for faults whose detail must not leak.
pub const GENERIC_LOGIN_ERROR: &str = "An error occurred while processing your request.";

/// Failure of the login pipeline after input validation. Every variant is
/// converted into an error redirect at the orchestrator boundary.
#[derive(Debug, Error)]
pub enum LoginError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl LoginError {
    /// The message carried in the error redirect. Provider validation
    /// faults are presumed user-meaningful and surfaced verbatim; all
    /// other faults collapse to the generic message.
    pub fn user_message(&self) -> String {
        match self {
            LoginError::Provider(ProviderError::Validation(msg)) => msg.clone(),
            LoginError::Provider(ProviderError::Transport(_)) => GENERIC_LOGIN_ERROR.to_string(),
            LoginError::Directory(_) => GENERIC_LOGIN_ERROR.to_string(),
        }
    }
}
