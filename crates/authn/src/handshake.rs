//! The API key handshake, end to end.

use std::sync::Arc;

use keygate_storage::auth::{ApiKeyStore, ChallengeStore};
use zeroize::Zeroizing;

use crate::{
    challenge::{ChallengeIssuer, IssuedChallenge},
    config::AuthConfig,
    error::AuthResult,
    registry::{KeyRegistry, KeyStatus},
    token::{IssuedToken, TokenIssuer},
    verify::SignatureVerifier,
};

/// Facade over the full challenge/response handshake.
///
/// ```text
/// client                              server
///   │  register(id, public_key)        │
///   │─────────────────────────────────►│  store key
///   │  request_challenge(id)           │
///   │─────────────────────────────────►│  random value, 60s TTL
///   │◄─────────────────────────────────│
///   │  sign(value, private_key)        │
///   │  request_token(id, value, sig)   │
///   │─────────────────────────────────►│  verify, consume, mint JWT
///   │◄─────────────────────────────────│
/// ```
///
/// The private key never crosses the wire; possession is proven by the
/// signature alone.
#[derive(Clone)]
pub struct ApiKeyAuthenticator {
    registry: KeyRegistry,
    issuer: ChallengeIssuer,
    verifier: SignatureVerifier,
    tokens: TokenIssuer,
    challenges: Arc<dyn ChallengeStore>,
}

impl ApiKeyAuthenticator {
    /// Wires the handshake components over the given stores.
    #[must_use]
    pub fn new(
        api_keys: Arc<dyn ApiKeyStore>,
        challenges: Arc<dyn ChallengeStore>,
        config: AuthConfig,
    ) -> Self {
        let registry = KeyRegistry::new(api_keys);
        let issuer =
            ChallengeIssuer::new(registry.clone(), Arc::clone(&challenges), config.challenge_ttl);
        let verifier = SignatureVerifier::new(registry.clone(), Arc::clone(&challenges));
        let tokens = TokenIssuer::new(config.token_secret, config.token_ttl);
        Self { registry, issuer, verifier, tokens, challenges }
    }

    /// Registers a client's public key, returning the stored record.
    /// See [`KeyRegistry::register`].
    pub async fn register(
        &self,
        api_key_id: &str,
        public_key: &str,
    ) -> AuthResult<keygate_storage::auth::ApiKeyRecord> {
        self.registry.register(api_key_id, public_key).await
    }

    /// Issues a challenge for the key. See [`ChallengeIssuer::issue`].
    pub async fn request_challenge(&self, api_key_id: &str) -> AuthResult<IssuedChallenge> {
        self.issuer.issue(api_key_id).await
    }

    /// Exchanges a signed challenge for a bearer token.
    ///
    /// Verifies the signature, consumes the challenge, deletes it, and
    /// mints the token. The consumed flag closes the replay window; the
    /// delete is cleanup.
    pub async fn request_token(
        &self,
        api_key_id: &str,
        challenge: &str,
        signature: &str,
    ) -> AuthResult<IssuedToken> {
        self.verifier.verify_and_consume(api_key_id, challenge, signature).await?;
        self.challenges.delete(api_key_id).await?;
        self.tokens.mint(api_key_id)
    }

    /// Reports the registration state of a key.
    pub async fn status(&self, api_key_id: &str) -> AuthResult<KeyStatus> {
        self.registry.status(api_key_id).await
    }

    /// Permanently revokes a key and drops any pending challenge.
    pub async fn revoke(&self, api_key_id: &str, reason: Option<&str>) -> AuthResult<()> {
        self.registry.revoke(api_key_id, reason).await?;
        Ok(self.challenges.delete(api_key_id).await?)
    }

    /// Deletes a key record, freeing the ID for re-registration.
    pub async fn delete_key(&self, api_key_id: &str) -> AuthResult<()> {
        self.registry.delete(api_key_id).await?;
        Ok(self.challenges.delete(api_key_id).await?)
    }

    /// Decodes a previously minted bearer token.
    pub fn decode_token(&self, token: &str) -> AuthResult<crate::token::TokenClaims> {
        self.tokens.decode(token)
    }
}

/// Client-side helper: signs a challenge value with a private key PEM.
///
/// Thin wrapper over [`crate::signer::sign_challenge`] so client code
/// does not need to reach into the signer module.
pub fn sign_challenge(
    challenge: &str,
    private_key_pem: &Zeroizing<String>,
) -> AuthResult<String> {
    crate::signer::sign_challenge(challenge, private_key_pem)
}
