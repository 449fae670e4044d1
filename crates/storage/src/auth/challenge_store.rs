//! Storage trait for pending handshake challenges.
//!
//! Challenges are short-lived, single-use records keyed by
//! `api_key_id`. The store enforces the single-use property through a
//! conditional consume operation so two concurrent token requests can
//! never both succeed with the same challenge.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::{
    auth::Challenge,
    error::{StorageError, StorageResult},
};

/// Persistence layer for pending challenges.
///
/// At most one challenge per `api_key_id` is live at a time; `put`
/// overwrites. Expiry is checked by the protocol layer, not the store:
/// the store keeps whatever it is given until it is deleted or
/// overwritten, so a backend with native TTL support may additionally
/// evict expired rows on its own.
#[async_trait]
pub trait ChallengeStore: Send + Sync {
    /// Stores a challenge, replacing any existing one for the same key.
    async fn put(&self, challenge: &Challenge) -> StorageResult<()>;

    /// Retrieves the current challenge for a key.
    ///
    /// Returns `Ok(None)` if no challenge is pending.
    async fn get(&self, api_key_id: &str) -> StorageResult<Option<Challenge>>;

    /// Atomically marks the challenge for `api_key_id` as consumed,
    /// provided its value matches `expected_value` and it has not been
    /// consumed yet.
    ///
    /// # Errors
    ///
    /// - [`StorageError::NotFound`] if no challenge is pending or the
    ///   stored value differs from `expected_value`.
    /// - [`StorageError::Conflict`] if the challenge was already
    ///   consumed, i.e. this call lost the race to another consumer.
    async fn mark_consumed(&self, api_key_id: &str, expected_value: &str) -> StorageResult<()>;

    /// Deletes the pending challenge for a key.
    ///
    /// Deleting a key with no pending challenge is a no-op.
    async fn delete(&self, api_key_id: &str) -> StorageResult<()>;
}

/// In-memory implementation of [`ChallengeStore`] for testing.
///
/// The consume check-and-set runs under a single write lock, which is
/// what makes `mark_consumed` atomic.
#[derive(Debug, Default, Clone)]
pub struct MemoryChallengeStore {
    challenges: Arc<RwLock<HashMap<String, Challenge>>>,
}

impl MemoryChallengeStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChallengeStore for MemoryChallengeStore {
    #[tracing::instrument(skip(self, challenge), fields(api_key_id = %challenge.api_key_id))]
    async fn put(&self, challenge: &Challenge) -> StorageResult<()> {
        let mut challenges = self.challenges.write();
        challenges.insert(challenge.api_key_id.clone(), challenge.clone());
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn get(&self, api_key_id: &str) -> StorageResult<Option<Challenge>> {
        let challenges = self.challenges.read();
        Ok(challenges.get(api_key_id).cloned())
    }

    #[tracing::instrument(skip(self, expected_value))]
    async fn mark_consumed(&self, api_key_id: &str, expected_value: &str) -> StorageResult<()> {
        let mut challenges = self.challenges.write();
        let challenge =
            challenges.get_mut(api_key_id).ok_or_else(|| StorageError::not_found(api_key_id))?;

        if challenge.value != expected_value {
            return Err(StorageError::not_found(api_key_id));
        }
        if challenge.consumed {
            return Err(StorageError::conflict());
        }

        challenge.consumed = true;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, api_key_id: &str) -> StorageResult<()> {
        let mut challenges = self.challenges.write();
        challenges.remove(api_key_id);
        Ok(())
    }
}
