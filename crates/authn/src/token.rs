//! Bearer token minting and decoding.
//!
//! Tokens are HS256 JWTs: the handshake proves possession of the API
//! key's private half, then everything after runs on this short-lived
//! symmetric-signed token instead of per-request RSA.

use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::AuthResult;

/// The `type` claim value stamped into every handshake token.
pub const API_KEY_TOKEN_TYPE: &str = "api-key";

/// The scheme clients present the token under.
pub const BEARER_TOKEN_TYPE: &str = "Bearer";

/// Claims carried by a handshake bearer token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// The API key the token was minted for.
    pub sub: String,
    /// Token category, always [`API_KEY_TOKEN_TYPE`] here. Lets a
    /// shared verifier distinguish handshake tokens from other kinds.
    #[serde(rename = "type")]
    pub token_type: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
    /// Unique token ID, for audit correlation.
    pub jti: String,
}

/// A minted token plus the metadata clients need to use it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedToken {
    /// The encoded JWT.
    pub token: String,
    /// Seconds until expiry.
    pub expires_in: u64,
    /// Always [`BEARER_TOKEN_TYPE`].
    pub token_type: String,
}

/// Mints and decodes HS256 bearer tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: Zeroizing<String>,
    ttl: Duration,
}

impl TokenIssuer {
    /// Creates an issuer with the given HMAC secret and token TTL.
    #[must_use]
    pub fn new(secret: Zeroizing<String>, ttl: Duration) -> Self {
        Self { secret, ttl }
    }

    /// Mints a bearer token for `api_key_id`.
    #[tracing::instrument(skip(self))]
    pub fn mint(&self, api_key_id: &str) -> AuthResult<IssuedToken> {
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            sub: api_key_id.to_owned(),
            token_type: API_KEY_TOKEN_TYPE.to_owned(),
            iat: now,
            exp: now + i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX),
            jti: generate_token_id(),
        };

        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;

        tracing::info!(
            audit.action = "api_key.token",
            api_key_id,
            jti = %claims.jti,
            expires_in = self.ttl.as_secs(),
            "bearer token issued"
        );

        Ok(IssuedToken {
            token,
            expires_in: self.ttl.as_secs(),
            token_type: BEARER_TOKEN_TYPE.to_owned(),
        })
    }

    /// Decodes and validates a bearer token, returning its claims.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AuthError::Token`] for bad signatures, expired
    /// tokens, and malformed input.
    pub fn decode(&self, token: &str) -> AuthResult<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);

        let data = jsonwebtoken::decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )?;
        Ok(data.claims)
    }
}

fn generate_token_id() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
