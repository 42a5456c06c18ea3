//! Domain errors surfaced by the service layer.
//!
//! The first block are domain outcomes the HTTP layer maps to 4xx responses.
//! Everything below propagates unmodified from the stores or the OAuth
//! provider; those requests fail without retries.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("invalid {0}")]
    InvalidData(&'static str),

    #[error("ticket does not grant access to hotel listings")]
    CannotListHotels,

    #[error("OAuth provider returned no usable email address")]
    OAuthEmailUnavailable,

    #[error("email is already registered")]
    DuplicateEmail,

    #[error("enrollment is only open while the event is active")]
    EnrollmentNotOpen,

    #[error("failed to hash password")]
    PasswordHash,

    #[error("failed to sign or decode session token")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error("cache operation failed: {0}")]
    Cache(#[source] anyhow::Error),

    #[error("OAuth provider request failed: {0}")]
    Provider(#[source] anyhow::Error),
}
