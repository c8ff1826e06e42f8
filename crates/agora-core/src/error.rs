use agora_store::LockPoisoned;
use thiserror::Error;

/// Errors surfaced by every messaging operation.
///
/// All of them are synchronous and final: nothing is retried server-side.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagingError {
    /// Missing, malformed or expired credential.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but the caller lacks the role for this action.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Bad input, unknown reference, or a business-rule violation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl MessagingError {
    pub(crate) fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub(crate) fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Static code for logs and response bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::Internal(_) => "internal",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Unauthorized(m) | Self::Forbidden(m) | Self::InvalidArgument(m) | Self::Internal(m) => m,
        }
    }
}

impl From<LockPoisoned> for MessagingError {
    fn from(e: LockPoisoned) -> Self {
        Self::Internal(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MessagingError>;
