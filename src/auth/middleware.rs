use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::app::AppState;
use crate::auth::models::Identity;
use crate::error::AppError;

/// Extractor that admits only verified admin callers.
///
/// Add it as a handler argument to protect a route; rejection happens before
/// the handler body (and therefore before any storage call) runs.
#[derive(Debug, Clone)]
pub struct AdminIdentity(pub Identity);

/// Pull the credential out of an `Authorization: Bearer <credential>` header value.
pub fn bearer_credential(header_value: &str) -> Option<&str> {
    let (scheme, credential) = header_value.trim().split_once(' ')?;
    let credential = credential.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !credential.is_empty() {
        Some(credential)
    } else {
        None
    }
}

impl FromRequestParts<AppState> for AdminIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let credential = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_credential)
            .ok_or_else(|| AppError::Auth("Not authenticated".into()))?;

        let identity = state.verifier.verify(credential)?;
        tracing::debug!("Authenticated {identity}");

        Ok(AdminIdentity(identity))
    }
}
