//! Challenge issuance.

use std::{sync::Arc, time::Duration};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use keygate_storage::auth::{Challenge, ChallengeStore};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::{error::AuthResult, registry::KeyRegistry};

/// Number of CSPRNG bytes behind each challenge value.
pub const CHALLENGE_BYTES: usize = 32;

/// A freshly issued challenge, as returned to the client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedChallenge {
    /// The value the client must sign, verbatim.
    pub value: String,
    /// Absolute expiry instant.
    pub expires_at: DateTime<Utc>,
    /// Seconds until expiry, for clients without synchronized clocks.
    pub expires_in: u64,
}

/// Issues time-boxed, single-use challenges for registered keys.
#[derive(Clone)]
pub struct ChallengeIssuer {
    registry: KeyRegistry,
    challenges: Arc<dyn ChallengeStore>,
    ttl: Duration,
}

impl ChallengeIssuer {
    /// Creates an issuer writing into the given challenge store.
    #[must_use]
    pub fn new(registry: KeyRegistry, challenges: Arc<dyn ChallengeStore>, ttl: Duration) -> Self {
        Self { registry, challenges, ttl }
    }

    /// Issues a new challenge for `api_key_id`, replacing any pending
    /// one. Only the newest challenge is ever acceptable.
    ///
    /// # Errors
    ///
    /// - [`crate::AuthError::KeyNotRegistered`] if no key exists.
    /// - [`crate::AuthError::KeyRevoked`] if the key is revoked or
    ///   inactive.
    #[tracing::instrument(skip(self))]
    pub async fn issue(&self, api_key_id: &str) -> AuthResult<IssuedChallenge> {
        self.registry.get_usable(api_key_id).await?;

        let value = generate_challenge_value();
        let now = Utc::now();
        let expires_at = now
            + chrono::Duration::from_std(self.ttl)
                .unwrap_or_else(|_| chrono::Duration::seconds(60));

        let challenge = Challenge::builder()
            .api_key_id(api_key_id.to_owned())
            .value(value.clone())
            .issued_at(now)
            .expires_at(expires_at)
            .build();
        self.challenges.put(&challenge).await?;

        tracing::info!(
            audit.action = "api_key.challenge",
            api_key_id,
            expires_in = self.ttl.as_secs(),
            "challenge issued"
        );

        Ok(IssuedChallenge { value, expires_at, expires_in: self.ttl.as_secs() })
    }
}

/// Generates a challenge value: base64 of [`CHALLENGE_BYTES`] bytes
/// from the OS CSPRNG.
fn generate_challenge_value() -> String {
    let mut bytes = [0u8; CHALLENGE_BYTES];
    OsRng.fill_bytes(&mut bytes);
    BASE64.encode(bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::collections::HashSet;

    use keygate_storage::auth::{MemoryApiKeyStore, MemoryChallengeStore};

    use super::*;
    use crate::{error::AuthError, testutil};

    fn issuer_with_stores() -> (ChallengeIssuer, KeyRegistry, Arc<MemoryChallengeStore>) {
        let keys = Arc::new(MemoryApiKeyStore::new());
        let challenges = Arc::new(MemoryChallengeStore::new());
        let registry = KeyRegistry::new(keys);
        let issuer = ChallengeIssuer::new(
            registry.clone(),
            Arc::<MemoryChallengeStore>::clone(&challenges) as Arc<dyn ChallengeStore>,
            Duration::from_secs(60),
        );
        (issuer, registry, challenges)
    }

    #[test]
    fn test_challenge_value_is_32_bytes_of_base64() {
        let value = generate_challenge_value();
        let decoded = BASE64.decode(&value).expect("valid base64");
        assert_eq!(decoded.len(), CHALLENGE_BYTES);
    }

    #[test]
    fn test_challenge_values_do_not_repeat() {
        let values: HashSet<String> = (0..100).map(|_| generate_challenge_value()).collect();
        assert_eq!(values.len(), 100);
    }

    #[tokio::test]
    async fn test_issue_requires_registered_key() {
        let (issuer, _, _) = issuer_with_stores();
        let result = issuer.issue("ghost").await;
        assert!(matches!(result, Err(AuthError::KeyNotRegistered { .. })));
    }

    #[tokio::test]
    async fn test_issue_rejects_revoked_key() {
        let (issuer, registry, _) = issuer_with_stores();
        let keys = testutil::generate_keypair();
        registry.register("client-1", &keys.public_pem).await.unwrap();
        registry.revoke("client-1", None).await.unwrap();

        let result = issuer.issue("client-1").await;
        assert!(matches!(result, Err(AuthError::KeyRevoked { .. })));
    }

    #[tokio::test]
    async fn test_issue_replaces_pending_challenge() {
        let (issuer, registry, challenges) = issuer_with_stores();
        let keys = testutil::generate_keypair();
        registry.register("client-1", &keys.public_pem).await.unwrap();

        let first = issuer.issue("client-1").await.unwrap();
        let second = issuer.issue("client-1").await.unwrap();
        assert_ne!(first.value, second.value);

        let pending = challenges.get("client-1").await.unwrap().unwrap();
        assert_eq!(pending.value, second.value);
    }

    #[tokio::test]
    async fn test_issued_challenge_carries_ttl() {
        let (issuer, registry, _) = issuer_with_stores();
        let keys = testutil::generate_keypair();
        registry.register("client-1", &keys.public_pem).await.unwrap();

        let before = Utc::now();
        let issued = issuer.issue("client-1").await.unwrap();
        assert_eq!(issued.expires_in, 60);
        assert!(issued.expires_at >= before + chrono::Duration::seconds(59));
        assert!(issued.expires_at <= Utc::now() + chrono::Duration::seconds(60));
    }
}
