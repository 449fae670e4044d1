//! Authentication error types.
//!
//! Variants are deliberately fine-grained so callers can log the exact
//! failure while the HTTP layer collapses challenge failures into one
//! generic response. Keep the split: the distinction between "expired"
//! and "wrong value" must never reach an unauthenticated client.

use keygate_storage::StorageError;
use thiserror::Error;

/// Result type alias for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors produced by the API key handshake.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]` — new variants may be added
/// in future minor releases without a semver-breaking change.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    /// No key is registered under the given ID.
    #[error("API key not registered: {api_key_id}")]
    KeyNotRegistered {
        /// The unknown key ID.
        api_key_id: String,
    },

    /// A key is already registered under the given ID.
    ///
    /// Registration never overwrites; the existing key must be revoked
    /// and deleted before the ID can be reused.
    #[error("API key already registered: {api_key_id}")]
    KeyAlreadyRegistered {
        /// The conflicting key ID.
        api_key_id: String,
    },

    /// The key exists but has been revoked or deactivated.
    #[error("API key revoked or inactive: {api_key_id}")]
    KeyRevoked {
        /// The revoked key ID.
        api_key_id: String,
    },

    /// The submitted public key could not be parsed as RSA PEM.
    #[error("Malformed public key: {message}")]
    MalformedPublicKey {
        /// What failed during parsing.
        message: String,
    },

    /// A private key could not be parsed for signing.
    ///
    /// Only produced by the client-side signer; the server never sees
    /// private keys.
    #[error("Malformed private key: {message}")]
    MalformedPrivateKey {
        /// What failed during parsing.
        message: String,
    },

    /// No challenge is pending for the key.
    #[error("No pending challenge")]
    ChallengeNotFound,

    /// The pending challenge has already been used for a token.
    #[error("Challenge already consumed")]
    ChallengeAlreadyConsumed,

    /// The pending challenge's time-to-live has elapsed.
    #[error("Challenge expired")]
    ChallengeExpired,

    /// The submitted challenge does not match the pending one.
    #[error("Challenge mismatch")]
    ChallengeMismatch,

    /// The signature does not verify against the registered public key.
    ///
    /// Also covers signatures that are not valid base64 or have an
    /// impossible length; the caller cannot tell these apart.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Token encoding or decoding failed.
    #[error("Token error: {source}")]
    Token {
        /// The underlying JWT error.
        #[source]
        source: jsonwebtoken::errors::Error,
    },

    /// A storage operation failed for a reason the handshake does not
    /// interpret (connectivity, serialization, backend internals).
    #[error("Storage error: {source}")]
    Storage {
        /// The underlying storage error.
        #[from]
        source: StorageError,
    },
}

impl AuthError {
    /// Creates a new `KeyNotRegistered` error.
    #[must_use]
    pub fn key_not_registered(api_key_id: impl Into<String>) -> Self {
        Self::KeyNotRegistered { api_key_id: api_key_id.into() }
    }

    /// Creates a new `KeyAlreadyRegistered` error.
    #[must_use]
    pub fn key_already_registered(api_key_id: impl Into<String>) -> Self {
        Self::KeyAlreadyRegistered { api_key_id: api_key_id.into() }
    }

    /// Creates a new `KeyRevoked` error.
    #[must_use]
    pub fn key_revoked(api_key_id: impl Into<String>) -> Self {
        Self::KeyRevoked { api_key_id: api_key_id.into() }
    }

    /// Creates a new `MalformedPublicKey` error.
    #[must_use]
    pub fn malformed_public_key(message: impl Into<String>) -> Self {
        Self::MalformedPublicKey { message: message.into() }
    }

    /// Creates a new `MalformedPrivateKey` error.
    #[must_use]
    pub fn malformed_private_key(message: impl Into<String>) -> Self {
        Self::MalformedPrivateKey { message: message.into() }
    }

    /// Whether this error is a challenge-stage failure.
    ///
    /// The HTTP layer maps all of these to the same generic 401 body so
    /// responses don't leak which check failed.
    #[must_use]
    pub fn is_challenge_failure(&self) -> bool {
        matches!(
            self,
            Self::ChallengeNotFound
                | Self::ChallengeAlreadyConsumed
                | Self::ChallengeExpired
                | Self::ChallengeMismatch
        )
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(source: jsonwebtoken::errors::Error) -> Self {
        Self::Token { source }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            AuthError::key_not_registered("abc").to_string(),
            "API key not registered: abc"
        );
        assert_eq!(AuthError::ChallengeExpired.to_string(), "Challenge expired");
        assert_eq!(AuthError::InvalidSignature.to_string(), "Invalid signature");
    }

    #[test]
    fn test_challenge_failure_classification() {
        assert!(AuthError::ChallengeNotFound.is_challenge_failure());
        assert!(AuthError::ChallengeAlreadyConsumed.is_challenge_failure());
        assert!(AuthError::ChallengeExpired.is_challenge_failure());
        assert!(AuthError::ChallengeMismatch.is_challenge_failure());
        assert!(!AuthError::InvalidSignature.is_challenge_failure());
        assert!(!AuthError::key_not_registered("abc").is_challenge_failure());
    }

    #[test]
    fn test_storage_error_conversion() {
        let err: AuthError = StorageError::timeout().into();
        assert!(matches!(err, AuthError::Storage { .. }));
    }
}
