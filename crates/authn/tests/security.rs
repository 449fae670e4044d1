//! End-to-end security properties of the handshake: replay, expiry,
//! tampering, cross-key isolation, and revocation.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{sync::Arc, time::Duration};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use keygate_authn::{
    assert_auth_error, handshake::sign_challenge, ApiKeyAuthenticator, AuthConfig, AuthError,
    API_KEY_TOKEN_TYPE,
};
use keygate_authn::testutil::{generate_keypair, KeyPair};
use keygate_storage::auth::{Challenge, ChallengeStore, MemoryApiKeyStore, MemoryChallengeStore};

struct Harness {
    auth: ApiKeyAuthenticator,
    challenges: Arc<MemoryChallengeStore>,
}

fn harness() -> Harness {
    let challenges = Arc::new(MemoryChallengeStore::new());
    let auth = ApiKeyAuthenticator::new(
        Arc::new(MemoryApiKeyStore::new()),
        Arc::<MemoryChallengeStore>::clone(&challenges),
        AuthConfig::builder()
            .token_secret("integration-test-secret".to_owned())
            .challenge_ttl(Duration::from_secs(60))
            .token_ttl(Duration::from_secs(4000))
            .build(),
    );
    Harness { auth, challenges }
}

async fn registered(h: &Harness, api_key_id: &str) -> KeyPair {
    let pair = generate_keypair();
    h.auth.register(api_key_id, &pair.public_pem).await.unwrap();
    pair
}

#[tokio::test]
async fn full_handshake_yields_decodable_token() {
    let h = harness();
    let pair = registered(&h, "client-1").await;

    let challenge = h.auth.request_challenge("client-1").await.unwrap();
    assert_eq!(challenge.expires_in, 60);

    let signature = sign_challenge(&challenge.value, &pair.private_pem).unwrap();
    let issued = h.auth.request_token("client-1", &challenge.value, &signature).await.unwrap();

    assert_eq!(issued.token_type, "Bearer");
    assert_eq!(issued.expires_in, 4000);

    let claims = h.auth.decode_token(&issued.token).unwrap();
    assert_eq!(claims.sub, "client-1");
    assert_eq!(claims.token_type, API_KEY_TOKEN_TYPE);
    assert_eq!(claims.exp - claims.iat, 4000);
}

#[tokio::test]
async fn token_request_consumes_the_challenge() {
    let h = harness();
    let pair = registered(&h, "client-1").await;

    let challenge = h.auth.request_challenge("client-1").await.unwrap();
    let signature = sign_challenge(&challenge.value, &pair.private_pem).unwrap();
    h.auth.request_token("client-1", &challenge.value, &signature).await.unwrap();

    // Challenge is gone from the store, so a replay reports not-found.
    assert!(h.challenges.get("client-1").await.unwrap().is_none());
    let replay = h.auth.request_token("client-1", &challenge.value, &signature).await;
    assert_auth_error!(replay, AuthError::ChallengeNotFound);
}

#[tokio::test]
async fn signature_from_wrong_private_key_rejected() {
    let h = harness();
    let _pair = registered(&h, "client-1").await;
    let intruder = generate_keypair();

    let challenge = h.auth.request_challenge("client-1").await.unwrap();
    let forged = sign_challenge(&challenge.value, &intruder.private_pem).unwrap();

    let result = h.auth.request_token("client-1", &challenge.value, &forged).await;
    assert_auth_error!(result, AuthError::InvalidSignature);
}

#[tokio::test]
async fn tampered_signature_rejected_challenge_survives() {
    let h = harness();
    let pair = registered(&h, "client-1").await;

    let challenge = h.auth.request_challenge("client-1").await.unwrap();
    let signature = sign_challenge(&challenge.value, &pair.private_pem).unwrap();

    let mut bytes = BASE64.decode(&signature).unwrap();
    let mid = bytes.len() / 2;
    bytes[mid] ^= 0x40;
    let tampered = BASE64.encode(&bytes);

    let result = h.auth.request_token("client-1", &challenge.value, &tampered).await;
    assert_auth_error!(result, AuthError::InvalidSignature);

    // The genuine signature still works afterwards.
    h.auth.request_token("client-1", &challenge.value, &signature).await.unwrap();
}

#[tokio::test]
async fn expired_challenge_rejected() {
    let h = harness();
    let pair = registered(&h, "client-1").await;

    // Plant a challenge whose TTL already elapsed.
    let stale = Challenge::builder()
        .api_key_id("client-1".to_owned())
        .value("stale-value".to_owned())
        .expires_at(chrono::Utc::now() - chrono::Duration::seconds(5))
        .build();
    h.challenges.put(&stale).await.unwrap();

    let signature = sign_challenge("stale-value", &pair.private_pem).unwrap();
    let result = h.auth.request_token("client-1", "stale-value", &signature).await;
    assert_auth_error!(result, AuthError::ChallengeExpired);
}

#[tokio::test]
async fn only_newest_challenge_is_acceptable() {
    let h = harness();
    let pair = registered(&h, "client-1").await;

    let old = h.auth.request_challenge("client-1").await.unwrap();
    let new = h.auth.request_challenge("client-1").await.unwrap();

    let old_signature = sign_challenge(&old.value, &pair.private_pem).unwrap();
    let result = h.auth.request_token("client-1", &old.value, &old_signature).await;
    assert_auth_error!(result, AuthError::ChallengeMismatch);

    let new_signature = sign_challenge(&new.value, &pair.private_pem).unwrap();
    h.auth.request_token("client-1", &new.value, &new_signature).await.unwrap();
}

#[tokio::test]
async fn challenges_do_not_cross_keys() {
    let h = harness();
    let pair_a = registered(&h, "client-a").await;
    let _pair_b = registered(&h, "client-b").await;

    let challenge_a = h.auth.request_challenge("client-a").await.unwrap();
    h.auth.request_challenge("client-b").await.unwrap();

    // A's challenge signed with A's key, presented as B.
    let signature = sign_challenge(&challenge_a.value, &pair_a.private_pem).unwrap();
    let result = h.auth.request_token("client-b", &challenge_a.value, &signature).await;
    assert_auth_error!(result, AuthError::ChallengeMismatch);
}

#[tokio::test]
async fn reregistration_requires_explicit_delete() {
    let h = harness();
    let original = registered(&h, "client-1").await;
    let replacement = generate_keypair();

    let takeover = h.auth.register("client-1", &replacement.public_pem).await;
    assert_auth_error!(takeover, AuthError::KeyAlreadyRegistered { .. });

    // The original key still completes a handshake.
    let challenge = h.auth.request_challenge("client-1").await.unwrap();
    let signature = sign_challenge(&challenge.value, &original.private_pem).unwrap();
    h.auth.request_token("client-1", &challenge.value, &signature).await.unwrap();

    // Delete, then the ID is free.
    h.auth.delete_key("client-1").await.unwrap();
    h.auth.register("client-1", &replacement.public_pem).await.unwrap();
}

#[tokio::test]
async fn revocation_blocks_pending_handshake() {
    let h = harness();
    let pair = registered(&h, "client-1").await;

    let challenge = h.auth.request_challenge("client-1").await.unwrap();
    h.auth.revoke("client-1", Some("compromised")).await.unwrap();

    let signature = sign_challenge(&challenge.value, &pair.private_pem).unwrap();
    let result = h.auth.request_token("client-1", &challenge.value, &signature).await;
    // Revocation also drops the pending challenge.
    assert_auth_error!(result, AuthError::ChallengeNotFound);

    let status = h.auth.status("client-1").await.unwrap();
    assert!(status.registered);
    assert!(!status.active);

    assert_auth_error!(
        h.auth.request_challenge("client-1").await,
        AuthError::KeyRevoked { .. }
    );
}

#[tokio::test]
async fn concurrent_token_requests_yield_one_token() {
    let h = harness();
    let pair = registered(&h, "client-1").await;

    let challenge = h.auth.request_challenge("client-1").await.unwrap();
    let signature = sign_challenge(&challenge.value, &pair.private_pem).unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let auth = h.auth.clone();
        let value = challenge.value.clone();
        let sig = signature.clone();
        handles.push(tokio::spawn(async move {
            auth.request_token("client-1", &value, &sig).await
        }));
    }

    let mut tokens = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            tokens += 1;
        }
    }
    assert_eq!(tokens, 1, "a challenge must never yield more than one token");
}

#[tokio::test]
async fn tokens_from_different_handshakes_are_distinct() {
    let h = harness();
    let pair = registered(&h, "client-1").await;
    let mut seen = std::collections::HashSet::new();

    for _ in 0..3 {
        let challenge = h.auth.request_challenge("client-1").await.unwrap();
        let signature = sign_challenge(&challenge.value, &pair.private_pem).unwrap();
        let issued =
            h.auth.request_token("client-1", &challenge.value, &signature).await.unwrap();
        let claims = h.auth.decode_token(&issued.token).unwrap();
        assert!(seen.insert(claims.jti), "token IDs must not repeat");
    }
}
