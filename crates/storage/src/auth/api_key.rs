//! Registered API key record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// A registered API key: the public half of a client's key pair.
///
/// The client generates the key pair and submits only the public key;
/// the private key never leaves the client. The record is created once
/// at registration, never mutated except for revocation, and removed
/// only by explicit deletion.
///
/// # Validation Rules
///
/// A key is usable for the handshake when:
/// - `active == true`
/// - `revoked_at.is_none()`
///
/// # Example
///
/// ```
/// use keygate_storage::auth::ApiKeyRecord;
///
/// let record = ApiKeyRecord::builder()
///     .api_key_id("client-abc".to_owned())
///     .public_key_pem("-----BEGIN PUBLIC KEY-----\n...".to_owned())
///     .build();
///
/// assert!(record.active);
/// assert!(record.revoked_at.is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, bon::Builder)]
#[serde(deny_unknown_fields)]
pub struct ApiKeyRecord {
    /// Client-chosen opaque identifier, unique across the store.
    pub api_key_id: String,

    /// RSA public key in PEM (SPKI) form.
    ///
    /// Stored normalized: real newlines, `-----BEGIN PUBLIC KEY-----`
    /// envelope. Wrapped in [`Zeroizing`] so the key material is
    /// scrubbed from memory when the record is dropped.
    #[builder(into)]
    pub public_key_pem: Zeroizing<String>,

    /// When the key was registered. Set once, never changes.
    #[builder(default = Utc::now())]
    pub registered_at: DateTime<Utc>,

    /// Whether this key is currently active.
    ///
    /// Inactive keys cannot start a handshake. This is a reversible
    /// soft-disable, unlike revocation.
    #[builder(default = true)]
    pub active: bool,

    /// Revocation timestamp (if revoked).
    ///
    /// Once set, this cannot be cleared. A revoked key is never
    /// accepted for a handshake regardless of other fields.
    pub revoked_at: Option<DateTime<Utc>>,

    /// Reason for revocation (if revoked).
    ///
    /// Uses `#[serde(default)]` for backward compatibility: records
    /// stored without this field deserialize with `None`.
    #[serde(default)]
    pub revocation_reason: Option<String>,
}

impl ApiKeyRecord {
    /// Whether this key may participate in a handshake.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.active && self.revoked_at.is_none()
    }
}
