//! Route handlers for the handshake endpoints.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use keygate_authn::{ApiKeyAuthenticator, AuthError};

use crate::types::{
    ChallengeRequest, ChallengeResponse, ErrorResponse, RegisterRequest, RegisterResponse,
    RevokeRequest, RevokeResponse, StatusParams, StatusResponse, TokenRequest, TokenResponse,
};

/// Shared state behind every handler.
pub struct AppState {
    /// The handshake itself.
    pub auth: ApiKeyAuthenticator,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

/// POST /auth/api-key/register - store a client's public key.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, HandlerError> {
    require_field(&req.api_key_id, "apiKeyId")?;
    require_field(&req.public_key, "publicKey")?;

    let record =
        state.auth.register(&req.api_key_id, &req.public_key).await.map_err(into_response)?;

    Ok(Json(RegisterResponse {
        success: true,
        api_key_id: record.api_key_id,
        created_at: record.registered_at,
        message: "Public key registered successfully".to_owned(),
    }))
}

/// POST /auth/api-key/challenge - issue a challenge to sign.
pub async fn challenge(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChallengeRequest>,
) -> Result<Json<ChallengeResponse>, HandlerError> {
    require_field(&req.api_key_id, "apiKeyId")?;

    let issued = state.auth.request_challenge(&req.api_key_id).await.map_err(into_response)?;
    Ok(Json(ChallengeResponse { challenge: issued.value, expires_in: issued.expires_in }))
}

/// POST /auth/api-key/token - exchange a signed challenge for a token.
pub async fn token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, HandlerError> {
    require_field(&req.api_key_id, "apiKeyId")?;
    require_field(&req.challenge, "challenge")?;
    require_field(&req.signature, "signature")?;

    let issued = state
        .auth
        .request_token(&req.api_key_id, &req.challenge, &req.signature)
        .await
        .map_err(into_response)?;

    Ok(Json(TokenResponse {
        success: true,
        token: issued.token,
        expires_in: issued.expires_in,
        token_type: issued.token_type,
    }))
}

/// GET /auth/api-key/status - report a key's registration state.
pub async fn status(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StatusParams>,
) -> Result<(StatusCode, Json<StatusResponse>), HandlerError> {
    require_field(&params.api_key_id, "apiKeyId")?;

    let status = state.auth.status(&params.api_key_id).await.map_err(into_response)?;
    let code = if status.registered { StatusCode::OK } else { StatusCode::NOT_FOUND };
    Ok((
        code,
        Json(StatusResponse {
            registered: status.registered,
            api_key_id: status.api_key_id,
            active: status.active,
        }),
    ))
}

/// DELETE /auth/api-key - permanently revoke a key.
pub async fn revoke(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RevokeRequest>,
) -> Result<Json<RevokeResponse>, HandlerError> {
    require_field(&req.api_key_id, "apiKeyId")?;

    state.auth.revoke(&req.api_key_id, req.reason.as_deref()).await.map_err(into_response)?;
    Ok(Json(RevokeResponse { success: true, api_key_id: req.api_key_id }))
}

fn require_field(value: &str, name: &str) -> Result<(), HandlerError> {
    if value.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Missing required field".to_owned(),
                details: Some(name.to_owned()),
            }),
        ));
    }
    Ok(())
}

/// Maps handshake errors onto HTTP responses.
///
/// Every challenge-stage failure collapses into one generic 401 body:
/// a client probing the token endpoint cannot learn whether a
/// challenge existed, expired, or was already used. The precise cause
/// is still in the logs.
fn into_response(err: AuthError) -> HandlerError {
    let (status, error, details) = match &err {
        AuthError::MalformedPublicKey { message } => {
            (StatusCode::BAD_REQUEST, "Malformed public key", Some(message.clone()))
        }
        AuthError::KeyNotRegistered { .. } => {
            (StatusCode::NOT_FOUND, "API key not registered", None)
        }
        AuthError::KeyAlreadyRegistered { .. } => {
            (StatusCode::CONFLICT, "API key already registered", None)
        }
        AuthError::KeyRevoked { .. } => (StatusCode::FORBIDDEN, "API key revoked", None),
        e if e.is_challenge_failure() => {
            (StatusCode::UNAUTHORIZED, "Invalid or expired challenge", None)
        }
        AuthError::InvalidSignature => (StatusCode::UNAUTHORIZED, "Invalid signature", None),
        _ => {
            tracing::error!(error = %err, "handshake request failed internally");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
        }
    };

    (status, Json(ErrorResponse { error: error.to_owned(), details }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_challenge_failures_share_one_body() {
        let variants = [
            AuthError::ChallengeNotFound,
            AuthError::ChallengeAlreadyConsumed,
            AuthError::ChallengeExpired,
            AuthError::ChallengeMismatch,
        ];

        for err in variants {
            let (status, Json(body)) = into_response(err);
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body.error, "Invalid or expired challenge");
            assert!(body.details.is_none());
        }
    }

    #[test]
    fn test_internal_errors_carry_no_details() {
        let err: AuthError = keygate_storage::StorageError::timeout().into();
        let (status, Json(body)) = into_response(err);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.details.is_none());
    }
}
