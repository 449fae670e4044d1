//! Request and response bodies for the handshake endpoints.
//!
//! Field names are camelCase on the wire; the structs stay snake_case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// POST /auth/api-key/register
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    /// Client-chosen key identifier.
    pub api_key_id: String,
    /// RSA public key: PEM, PEM with escaped newlines, or bare base64.
    pub public_key: String,
}

/// Successful registration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    /// Always `true` on the success path.
    pub success: bool,
    /// The registered key ID, echoed back.
    pub api_key_id: String,
    /// When the key was stored.
    pub created_at: DateTime<Utc>,
    /// Human-readable confirmation.
    pub message: String,
}

/// POST /auth/api-key/challenge
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChallengeRequest {
    /// The key to issue a challenge for.
    pub api_key_id: String,
}

/// A freshly issued challenge.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    /// The value to sign, verbatim.
    pub challenge: String,
    /// Seconds until the challenge expires.
    pub expires_in: u64,
}

/// POST /auth/api-key/token
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TokenRequest {
    /// The key the challenge was issued for.
    pub api_key_id: String,
    /// The challenge value, exactly as received.
    pub challenge: String,
    /// Base64 RSA-SHA256 signature over the challenge.
    pub signature: String,
}

/// A minted bearer token.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    /// Always `true` on the success path.
    pub success: bool,
    /// The encoded JWT.
    pub token: String,
    /// Seconds until the token expires.
    pub expires_in: u64,
    /// Always `"Bearer"`.
    pub token_type: String,
}

/// GET /auth/api-key/status query parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusParams {
    /// The key to report on.
    pub api_key_id: String,
}

/// Registration state of a key. Asking about an unknown ID is not an
/// error; it reports `registered: false`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// Whether any key is registered under the ID.
    pub registered: bool,
    /// The key ID the status describes.
    pub api_key_id: String,
    /// Whether the key is active.
    pub active: bool,
}

/// DELETE /auth/api-key
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RevokeRequest {
    /// The key to revoke.
    pub api_key_id: String,
    /// Optional audit note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Acknowledgement of a revocation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeResponse {
    /// Always `true` on the success path.
    pub success: bool,
    /// The revoked key ID, echoed back.
    pub api_key_id: String,
}

/// Error body shared by every endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short category of the failure.
    pub error: String,
    /// Extra context, omitted where it would leak handshake state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
