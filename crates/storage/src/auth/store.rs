//! Storage trait for API key lifecycle operations.
//!
//! This module provides the [`ApiKeyStore`] trait that abstracts
//! persistence of registered public keys. Implementations can use
//! different backends (a remote key-value store in production, in-memory
//! for testing). The backend must offer read-after-write consistency per
//! `api_key_id`; cross-key consistency is not required.
//!
//! # Key Lifecycle
//!
//! ```text
//! ┌────────────┐     ┌────────────┐     ┌────────────┐
//! │ Registered │────►│   Active   │────►│  Revoked   │
//! │            │     │            │     │ (permanent)│
//! └────────────┘     └─────┬──────┘     └────────────┘
//!                          │
//!                          ▼
//!                    ┌────────────┐
//!                    │  Deleted   │
//!                    └────────────┘
//! ```

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::{
    auth::ApiKeyRecord,
    error::{StorageError, StorageResult},
};

/// Persistence layer for registered API keys.
///
/// # Error Handling
///
/// Operations return [`StorageResult`] with appropriate [`StorageError`]
/// variants. None of the operations retry internally; transient failures
/// surface to the caller.
#[async_trait]
pub trait ApiKeyStore: Send + Sync {
    /// Stores a new API key record.
    ///
    /// Registration never overwrites: if a record with the same
    /// `api_key_id` already exists, this fails with
    /// [`StorageError::AlreadyExists`]. Replacing a key requires an
    /// explicit delete (or revocation) first.
    async fn create_key(&self, record: &ApiKeyRecord) -> StorageResult<()>;

    /// Retrieves an API key record by ID.
    ///
    /// Returns `Ok(None)` if no key is registered under `api_key_id`.
    async fn get_key(&self, api_key_id: &str) -> StorageResult<Option<ApiKeyRecord>>;

    /// Marks a key as revoked (permanent, with timestamp).
    ///
    /// Idempotent: revoking an already-revoked key succeeds without
    /// modifying the original `revoked_at` timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if the key doesn't exist.
    async fn revoke_key(&self, api_key_id: &str, reason: Option<&str>) -> StorageResult<()>;

    /// Deletes a key record entirely.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if the key doesn't exist.
    async fn delete_key(&self, api_key_id: &str) -> StorageResult<()>;
}

/// In-memory implementation of [`ApiKeyStore`] for testing.
///
/// Stores records in a thread-safe hash map. Does not persist data
/// between restarts.
///
/// # Thread Safety
///
/// Uses [`parking_lot::RwLock`] for efficient concurrent access with
/// reader-writer semantics. Each mutation holds the write lock for the
/// full check-then-write, which gives the per-key atomicity the
/// protocol relies on.
#[derive(Debug, Default, Clone)]
pub struct MemoryApiKeyStore {
    keys: Arc<RwLock<HashMap<String, ApiKeyRecord>>>,
}

impl MemoryApiKeyStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApiKeyStore for MemoryApiKeyStore {
    #[tracing::instrument(skip(self, record), fields(api_key_id = %record.api_key_id))]
    async fn create_key(&self, record: &ApiKeyRecord) -> StorageResult<()> {
        let mut keys = self.keys.write();

        if keys.contains_key(&record.api_key_id) {
            return Err(StorageError::already_exists(&record.api_key_id));
        }

        keys.insert(record.api_key_id.clone(), record.clone());
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn get_key(&self, api_key_id: &str) -> StorageResult<Option<ApiKeyRecord>> {
        let keys = self.keys.read();
        Ok(keys.get(api_key_id).cloned())
    }

    #[tracing::instrument(skip(self))]
    async fn revoke_key(&self, api_key_id: &str, reason: Option<&str>) -> StorageResult<()> {
        let mut keys = self.keys.write();
        let record = keys.get_mut(api_key_id).ok_or_else(|| StorageError::not_found(api_key_id))?;

        if record.revoked_at.is_none() {
            record.revoked_at = Some(Utc::now());
            record.revocation_reason = reason.map(str::to_owned);
            record.active = false;
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_key(&self, api_key_id: &str) -> StorageResult<()> {
        let mut keys = self.keys.write();
        keys.remove(api_key_id).ok_or_else(|| StorageError::not_found(api_key_id))?;
        Ok(())
    }
}
