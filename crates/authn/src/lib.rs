//! Challenge/response authentication for client-held API keys.
//!
//! Clients prove possession of an RSA private key instead of sending a
//! shared secret: they register the public half once, then each session
//! starts with a server-issued random challenge the client signs. A
//! valid signature is exchanged for a short-lived HS256 bearer token.
//!
//! The handshake properties this crate enforces:
//!
//! - challenges are single-use: a consumed challenge never yields a
//!   second token, even under concurrent requests
//! - challenges expire after a configurable TTL (60s by default)
//! - only the newest challenge per key is acceptable
//! - verification failures are indistinguishable to clients, while
//!   logs record the precise cause
//!
//! # Example
//!
//! ```no_run
//! # async fn example() -> keygate_authn::AuthResult<()> {
//! use std::sync::Arc;
//!
//! use keygate_authn::{ApiKeyAuthenticator, AuthConfig};
//! use keygate_storage::auth::{MemoryApiKeyStore, MemoryChallengeStore};
//!
//! let auth = ApiKeyAuthenticator::new(
//!     Arc::new(MemoryApiKeyStore::new()),
//!     Arc::new(MemoryChallengeStore::new()),
//!     AuthConfig::builder().token_secret("hmac-secret".to_owned()).build(),
//! );
//!
//! auth.register("client-1", "-----BEGIN PUBLIC KEY-----...").await?;
//! let challenge = auth.request_challenge("client-1").await?;
//! // client signs challenge.value with its private key ...
//! # let signature = String::new();
//! let token = auth.request_token("client-1", &challenge.value, &signature).await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod challenge;
pub mod config;
pub mod error;
pub mod handshake;
pub mod registry;
pub mod signer;
pub mod token;
pub mod verify;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use challenge::{ChallengeIssuer, IssuedChallenge, CHALLENGE_BYTES};
pub use config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use handshake::ApiKeyAuthenticator;
pub use registry::{KeyRegistry, KeyStatus};
pub use token::{IssuedToken, TokenClaims, TokenIssuer, API_KEY_TOKEN_TYPE, BEARER_TOKEN_TYPE};
pub use verify::SignatureVerifier;
