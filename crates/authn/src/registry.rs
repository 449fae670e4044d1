//! Registration and lifecycle of client public keys.

use std::sync::Arc;

use keygate_storage::{
    auth::{ApiKeyRecord, ApiKeyStore},
    StorageError,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AuthError, AuthResult},
    signer,
};

/// Snapshot of a key's registration state, as reported to clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyStatus {
    /// Whether any key is registered under the ID.
    pub registered: bool,
    /// The key ID the status describes.
    pub api_key_id: String,
    /// Whether the key is active (always `false` when unregistered).
    pub active: bool,
}

/// Manages registered public keys on top of an [`ApiKeyStore`].
///
/// Submitted keys are normalized into canonical SPKI PEM before
/// storage, so every later read hands the verifier a directly
/// parseable key.
#[derive(Clone)]
pub struct KeyRegistry {
    store: Arc<dyn ApiKeyStore>,
}

impl KeyRegistry {
    /// Creates a registry over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn ApiKeyStore>) -> Self {
        Self { store }
    }

    /// Registers a new public key under `api_key_id`.
    ///
    /// # Errors
    ///
    /// - [`AuthError::MalformedPublicKey`] if the key does not parse.
    /// - [`AuthError::KeyAlreadyRegistered`] if the ID is taken. An
    ///   existing key is never silently replaced; it must be revoked
    ///   and deleted first.
    #[tracing::instrument(skip(self, public_key))]
    pub async fn register(&self, api_key_id: &str, public_key: &str) -> AuthResult<ApiKeyRecord> {
        let normalized = signer::normalize_public_key_pem(public_key)?;

        let record = ApiKeyRecord::builder()
            .api_key_id(api_key_id.to_owned())
            .public_key_pem(normalized)
            .build();

        self.store.create_key(&record).await.map_err(|e| match e {
            StorageError::AlreadyExists { .. } => AuthError::key_already_registered(api_key_id),
            other => other.into(),
        })?;

        tracing::info!(audit.action = "api_key.register", api_key_id, "API key registered");
        Ok(record)
    }

    /// Fetches the record for `api_key_id` and checks it may take part
    /// in a handshake.
    ///
    /// # Errors
    ///
    /// - [`AuthError::KeyNotRegistered`] if no key exists.
    /// - [`AuthError::KeyRevoked`] if the key is revoked or inactive.
    pub async fn get_usable(&self, api_key_id: &str) -> AuthResult<ApiKeyRecord> {
        let record = self
            .store
            .get_key(api_key_id)
            .await?
            .ok_or_else(|| AuthError::key_not_registered(api_key_id))?;

        if !record.is_usable() {
            return Err(AuthError::key_revoked(api_key_id));
        }
        Ok(record)
    }

    /// Reports the registration state of `api_key_id`.
    ///
    /// Unregistered IDs are not an error here; they report
    /// `registered: false`.
    pub async fn status(&self, api_key_id: &str) -> AuthResult<KeyStatus> {
        let status = match self.store.get_key(api_key_id).await? {
            Some(record) => KeyStatus {
                registered: true,
                active: record.is_usable(),
                api_key_id: record.api_key_id,
            },
            None => {
                KeyStatus { registered: false, api_key_id: api_key_id.to_owned(), active: false }
            }
        };
        Ok(status)
    }

    /// Permanently revokes the key.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::KeyNotRegistered`] if no key exists.
    #[tracing::instrument(skip(self))]
    pub async fn revoke(&self, api_key_id: &str, reason: Option<&str>) -> AuthResult<()> {
        self.store.revoke_key(api_key_id, reason).await.map_err(|e| match e {
            StorageError::NotFound { .. } => AuthError::key_not_registered(api_key_id),
            other => other.into(),
        })?;

        tracing::info!(audit.action = "api_key.revoke", api_key_id, reason, "API key revoked");
        Ok(())
    }

    /// Deletes the key record, freeing the ID for re-registration.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::KeyNotRegistered`] if no key exists.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, api_key_id: &str) -> AuthResult<()> {
        self.store.delete_key(api_key_id).await.map_err(|e| match e {
            StorageError::NotFound { .. } => AuthError::key_not_registered(api_key_id),
            other => other.into(),
        })?;

        tracing::info!(audit.action = "api_key.delete", api_key_id, "API key deleted");
        Ok(())
    }
}
