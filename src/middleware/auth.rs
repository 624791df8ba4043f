use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ErrorInfo;
use crate::secrets::AuthError;
use crate::state::AppState;

/// Label of the allow-list entry a verified request authenticated as,
/// injected into request extensions for downstream handlers.
#[derive(Clone, Debug)]
pub struct AuthClient(pub String);

/// Verifies the configured credential header against the secrets-backed
/// allow-list before any business handler runs. A missing or empty
/// header is rejected without consulting the backend.
pub async fn api_key_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let header_name = &state.config.auth.header_name;
    let token = request
        .headers()
        .get(header_name.as_str())
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_string();

    if token.is_empty() {
        let message = format!("No value given for '{}' header", header_name);
        tracing::error!("rejected {}: {}", request.uri().path(), message);
        return ErrorInfo::new(StatusCode::UNAUTHORIZED, message, request.uri()).into_response();
    }

    match state.verifier.verify_service_token(&token).await {
        Ok(label) => {
            tracing::debug!(client = %label, "service token verified");
            request.extensions_mut().insert(AuthClient(label));
            next.run(request).await
        }
        Err(err @ AuthError::BadCredentials(_)) => {
            tracing::error!("rejected {}: {}", request.uri().path(), err);
            ErrorInfo::new(StatusCode::UNAUTHORIZED, err.to_string(), request.uri())
                .into_response()
        }
        Err(err) => {
            tracing::error!("secrets backend unavailable: {}", err);
            ErrorInfo::new(StatusCode::BAD_GATEWAY, err.to_string(), request.uri())
                .into_response()
        }
    }
}
