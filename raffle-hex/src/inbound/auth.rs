//! Administrator authentication for ticket management routes.

use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use raffle_types::RaffleRepository;

use super::handlers::AppState;

/// Hashes an administrator key using SHA-256.
pub fn hash_admin_key(key: &str) -> String {
    let hash = Sha256::digest(key.as_bytes());
    hex::encode(hash)
}

/// Verifies a presented key against a stored hash using constant-time comparison.
pub fn verify_admin_key(input: &str, stored_hash: &str) -> bool {
    let input_hash = hash_admin_key(input);
    input_hash.as_bytes().ct_eq(stored_hash.as_bytes()).into()
}

/// Extracts the key from an `Authorization: Bearer <key>` header.
fn extract_bearer(auth_header: Option<&str>) -> Option<&str> {
    auth_header?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|key| !key.is_empty())
}

/// Middleware guarding the administrator routes.
///
/// Requests pass only when they carry the configured key. Without a
/// configured key every request is rejected.
pub async fn admin_middleware<R: RaffleRepository>(
    State(state): State<Arc<AppState<R>>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(stored_hash) = state.admin_key_hash.as_deref() else {
        tracing::warn!(path = %request.uri().path(), "Admin route called but no admin key is configured");
        return unauthorized_response("Administrator access is disabled");
    };

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match extract_bearer(auth_header) {
        Some(key) if verify_admin_key(key, stored_hash) => next.run(request).await,
        Some(_) => {
            tracing::warn!(path = %request.uri().path(), "Rejected invalid admin key");
            unauthorized_response("Invalid admin key")
        }
        None => unauthorized_response("Missing or invalid Authorization header"),
    }
}

fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": message,
            "code": 401
        })),
    )
        .into_response()
}
