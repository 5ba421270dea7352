use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{AuthError, IdentityVerifier, VerifiedIdentity};
use crate::error::ApiError;

/// Authentication middleware for protected routes.
///
/// Rejects with 401 before the handler (and its body extractor) runs;
/// on success the identity is stored in the request extensions for the
/// [`VerifiedIdentity`] extractor.
pub async fn require_identity(
    State(verifier): State<Arc<IdentityVerifier>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = authorization_header(request.headers())
        .and_then(|value| verifier.verify(value))
        .map_err(|err| {
            tracing::warn!(
                method = %request.method(),
                path = %request.uri().path(),
                reason = %err,
                "Rejected unauthenticated request"
            );
            ApiError::from(err)
        })?;

    tracing::debug!(subject = %identity.subject, source = ?identity.source, "Request authenticated");

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

fn authorization_header(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    match headers.get(AUTHORIZATION) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(Some)
            .map_err(|_| AuthError::MalformedHeader),
    }
}

/// Handlers take `VerifiedIdentity` as an argument; outside of
/// [`require_identity`] the extractor fails closed with 401.
#[async_trait]
impl<S> FromRequestParts<S> for VerifiedIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<VerifiedIdentity>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}
