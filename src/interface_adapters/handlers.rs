use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};

use crate::domain::errors::BrokerError;
use crate::interface_adapters::protocol::{
    CloudTokenPayload, GatewayTokenPayload, TokenRequest, TokenResponse,
};
use crate::interface_adapters::state::AppState;
use crate::use_cases::issue_credentials::IssueCredentialsUseCase;

// Handler for the token exchange endpoint.
#[tracing::instrument(name = "issue_tokens", skip_all)]
pub async fn issue_tokens(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, (StatusCode, String)> {
    let assertion = bearer_assertion(&headers);

    let use_case = IssueCredentialsUseCase {
        verifier: state.verifier.clone(),
        clock: state.clock.clone(),
        rooms: state.rooms.clone(),
        minter: state.minter.clone(),
        accounts: state.accounts.clone(),
    };

    let bundle = use_case
        .execute(assertion.as_deref(), body.room_id.as_deref())
        .await
        .map_err(map_broker_error)?;

    Ok(Json(TokenResponse {
        gcp: CloudTokenPayload {
            token: bundle.cloud.token,
            expire_time: bundle.cloud.expire_time,
        },
        api_gateway: GatewayTokenPayload {
            endpoint: bundle.gateway.endpoint,
            token: bundle.gateway.token,
            expire_time: bundle.gateway.expire_time,
        },
    }))
}

// The forwarded header wins when the broker sits behind the API gateway.
// A present-but-malformed header is not fallen through; it reads as no
// credential, same as an upstream gateway would treat it.
fn bearer_assertion(headers: &HeaderMap) -> Option<String> {
    let raw = headers
        .get("x-forwarded-authorization")
        .or_else(|| headers.get(header::AUTHORIZATION))?;
    let token = raw.to_str().ok()?.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

// Maps broker failures onto the plain-text HTTP contract. Denial detail is
// logged here and never returned to the caller.
fn map_broker_error(err: BrokerError) -> (StatusCode, String) {
    match err {
        BrokerError::MissingCredential => (
            StatusCode::UNAUTHORIZED,
            "Authentication required".to_string(),
        ),
        BrokerError::InvalidCredential(detail) => {
            tracing::warn!(%detail, "identity verification failed");
            (StatusCode::FORBIDDEN, "Authentication failed".to_string())
        }
        BrokerError::UnknownProvider(tag) => {
            tracing::warn!(%tag, "no service account mapped for provider");
            (StatusCode::FORBIDDEN, "Authentication failed".to_string())
        }
        BrokerError::MissingRoomId => {
            (StatusCode::BAD_REQUEST, "Room ID is missing".to_string())
        }
        err @ (BrokerError::RoomNotFound
        | BrokerError::GuestMismatch
        | BrokerError::NoExpiry
        | BrokerError::Expired) => {
            tracing::info!(reason = %err, "guest access denied");
            (
                StatusCode::FORBIDDEN,
                "You're not allowed in this room".to_string(),
            )
        }
        BrokerError::MintingFailure(detail) => {
            tracing::error!(%detail, "credential minting failed");
            (
                StatusCode::BAD_GATEWAY,
                "Token generation failed".to_string(),
            )
        }
        BrokerError::StorageFailure(detail) => {
            tracing::error!(%detail, "room store unavailable");
            (
                StatusCode::BAD_GATEWAY,
                "Token generation failed".to_string(),
            )
        }
    }
}
