//! Session cookie extractors.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum_extra::extract::CookieJar;
use http::request::Parts;

use gcmn_core::error::AppError;

use crate::cookie::GCMN_SESSION;
use crate::token::{Principal, validate_session_token};

/// Shared secret used to sign and verify session tokens.
///
/// Services expose it from their state with `FromRef`.
#[derive(Clone)]
pub struct SessionKey(pub Arc<str>);

impl SessionKey {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self(secret.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn principal_from_parts(parts: &Parts, key: &SessionKey) -> Option<Principal> {
    let jar = CookieJar::from_headers(&parts.headers);
    let token = jar.get(GCMN_SESSION)?.value();
    match validate_session_token(token, key.as_str()) {
        Ok(principal) => Some(principal),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring invalid session cookie");
            None
        }
    }
}

/// An authenticated session. Rejects with 401 when the cookie is missing,
/// expired, or not signed with the service key.
#[derive(Debug, Clone)]
pub struct Session(pub Principal);

impl<S> FromRequestParts<S> for Session
where
    SessionKey: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    // Resolve synchronously and return a 'static future so the borrowed parts
    // are not captured across the await point.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let key = SessionKey::from_ref(state);
        let principal = principal_from_parts(parts, &key);
        async move { principal.map(Session).ok_or(AppError::Unauthenticated) }
    }
}

/// A session that may be absent. Used by routes open to anonymous callers
/// that still record who made the request when known.
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<Principal>);

impl<S> FromRequestParts<S> for MaybeSession
where
    SessionKey: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let key = SessionKey::from_ref(state);
        let principal = principal_from_parts(parts, &key);
        async move { Ok(MaybeSession(principal)) }
    }
}
