//! Error types for talking to the Juicebox daemon

use thiserror::Error;

/// Everything that can go wrong between a user action and the daemon.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Network failure or non-success HTTP status
    #[error("Transport error: {0}")]
    Transport(String),

    /// Payload did not fit the player model
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Argument rejected locally, nothing was sent
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Command name outside the known transport set
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}

impl ClientError {
    /// Errors a refresh absorbs instead of surfacing.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::MalformedResponse(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::MalformedResponse(error.to_string())
        } else {
            Self::Transport(error.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
