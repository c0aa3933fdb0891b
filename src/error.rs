use thiserror::Error;

/// Unified error type for release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Version parsing error: {0}")]
    Parse(String),

    #[error("Release kind {0} not supported")]
    UnsupportedReleaseKind(String),

    #[error("Tag already exists: {0}")]
    AlreadyExists(String),

    #[error("Integrity error: {0}")]
    Integrity(String),

    #[error("Transport error: {0}")]
    Transport(String),

    /// Terminal error reported by a remote long-running operation.
    /// The message is displayed verbatim.
    #[error("{0}")]
    Operation(String),

    #[error("Operation aborted: {0}")]
    Aborted(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Repository error: {0}")]
    Repository(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in alis
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    pub fn parse(msg: impl Into<String>) -> Self {
        ReleaseError::Parse(msg.into())
    }

    pub fn integrity(msg: impl Into<String>) -> Self {
        ReleaseError::Integrity(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        ReleaseError::Transport(msg.into())
    }

    pub fn operation(msg: impl Into<String>) -> Self {
        ReleaseError::Operation(msg.into())
    }

    pub fn aborted(msg: impl Into<String>) -> Self {
        ReleaseError::Aborted(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        ReleaseError::InvalidArgument(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// True for the one error the release loop recovers from by bumping
    /// the candidate version.
    pub fn is_tag_collision(&self) -> bool {
        matches!(self, ReleaseError::AlreadyExists(_))
    }
}

impl From<reqwest::Error> for ReleaseError {
    fn from(err: reqwest::Error) -> Self {
        ReleaseError::Transport(err.to_string())
    }
}
