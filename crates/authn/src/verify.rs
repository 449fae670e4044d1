//! Signature verification over pending challenges.

use std::sync::Arc;

use chrono::Utc;
use keygate_storage::{auth::ChallengeStore, StorageError};

use crate::{
    error::{AuthError, AuthResult},
    registry::KeyRegistry,
    signer,
};

/// Verifies signed challenges and consumes them on success.
///
/// Checks run in a fixed order so every failure mode is attributed
/// precisely in logs while remaining indistinguishable to clients:
/// challenge existence, consumption, expiry, and value match come
/// before any key lookup or cryptography. A challenge is marked
/// consumed only after the signature verifies; failed attempts leave
/// it pending until its TTL runs out.
#[derive(Clone)]
pub struct SignatureVerifier {
    registry: KeyRegistry,
    challenges: Arc<dyn ChallengeStore>,
}

impl SignatureVerifier {
    /// Creates a verifier reading from the given challenge store.
    #[must_use]
    pub fn new(registry: KeyRegistry, challenges: Arc<dyn ChallengeStore>) -> Self {
        Self { registry, challenges }
    }

    /// Verifies `signature_b64` over `challenge_value` for
    /// `api_key_id`, consuming the pending challenge on success.
    ///
    /// # Errors
    ///
    /// - [`AuthError::ChallengeNotFound`] if no challenge is pending.
    /// - [`AuthError::ChallengeAlreadyConsumed`] on replay, including
    ///   losing a race to a concurrent request.
    /// - [`AuthError::ChallengeExpired`] past the TTL (the stale
    ///   challenge is dropped).
    /// - [`AuthError::ChallengeMismatch`] if the submitted value is not
    ///   the pending one.
    /// - [`AuthError::KeyNotRegistered`] / [`AuthError::KeyRevoked`]
    ///   if the key vanished or was revoked since issuance.
    /// - [`AuthError::InvalidSignature`] if verification fails.
    #[tracing::instrument(skip(self, challenge_value, signature_b64))]
    pub async fn verify_and_consume(
        &self,
        api_key_id: &str,
        challenge_value: &str,
        signature_b64: &str,
    ) -> AuthResult<()> {
        let pending =
            self.challenges.get(api_key_id).await?.ok_or(AuthError::ChallengeNotFound)?;

        if pending.consumed {
            return Err(AuthError::ChallengeAlreadyConsumed);
        }
        if pending.is_expired(Utc::now()) {
            self.challenges.delete(api_key_id).await?;
            return Err(AuthError::ChallengeExpired);
        }
        if pending.value != challenge_value {
            return Err(AuthError::ChallengeMismatch);
        }

        let record = self.registry.get_usable(api_key_id).await?;
        signer::verify_challenge_signature(
            challenge_value,
            signature_b64,
            &record.public_key_pem,
        )?;

        // Conditional update: a concurrent request that verified the
        // same challenge first wins, this one reports a replay.
        self.challenges.mark_consumed(api_key_id, challenge_value).await.map_err(
            |e| match e {
                StorageError::Conflict => AuthError::ChallengeAlreadyConsumed,
                StorageError::NotFound { .. } => AuthError::ChallengeNotFound,
                other => other.into(),
            },
        )?;

        tracing::info!(audit.action = "api_key.verify", api_key_id, "challenge signature verified");
        Ok(())
    }
}
