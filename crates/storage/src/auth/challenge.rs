//! Pending handshake challenge record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A server-issued challenge awaiting a signature from the client.
///
/// At most one live challenge exists per `api_key_id`: issuing a new
/// one overwrites any previous unconsumed challenge, so there is never
/// ambiguity about which challenge is current.
///
/// # Lifecycle
///
/// ```text
/// issued ──► signed & verified ──► consumed ──► deleted (token minted)
///    │
///    └─────► expires_at passes ──► rejected on next lookup
/// ```
///
/// A challenge must never be accepted twice; `consumed` flips to true
/// exactly once, and the store's conditional update rejects the second
/// attempt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, bon::Builder)]
#[serde(deny_unknown_fields)]
pub struct Challenge {
    /// The API key this challenge was issued for.
    pub api_key_id: String,

    /// Single-use random value (base64 of 32 CSPRNG bytes).
    pub value: String,

    /// When the challenge was issued.
    #[builder(default = Utc::now())]
    pub issued_at: DateTime<Utc>,

    /// When the challenge stops being acceptable.
    pub expires_at: DateTime<Utc>,

    /// Whether a token request has already used this challenge.
    #[builder(default = false)]
    #[serde(default)]
    pub consumed: bool,
}

impl Challenge {
    /// Whether the challenge has expired relative to `now`.
    ///
    /// The boundary is inclusive on the valid side: a challenge is
    /// still acceptable at exactly `expires_at`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
