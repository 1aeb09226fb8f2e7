//! Session tokens: HS256 JWTs signed with the service's shared secret.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Session lifetime in seconds (24 hours).
pub const SESSION_TTL_SECS: u64 = 86_400;

/// Subject used for the fixed administrator account.
pub const ADMIN_SUBJECT: &str = "admin";

/// Who a session belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    /// The fixed administrator configured for the deployment.
    Admin,
    /// A registered user account.
    User { user_id: String },
    /// A library card holder, authenticated by an approved card number.
    Card { application_id: String },
}

impl Principal {
    fn kind(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User { .. } => "user",
            Self::Card { .. } => "card",
        }
    }

    /// The id the session acts as: user id, card application id, or `"admin"`.
    pub fn subject(&self) -> &str {
        match self {
            Self::Admin => ADMIN_SUBJECT,
            Self::User { user_id } => user_id,
            Self::Card { application_id } => application_id,
        }
    }
}

/// Errors returned by [`validate_session_token`] and [`issue_session_token`].
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("session expired")]
    Expired,
    #[error("malformed session")]
    Malformed,
    #[error("failed to sign session")]
    Signing,
}

/// JWT claims payload.
///
/// | Field | Meaning |
/// |-------|---------|
/// | `sub` | user id, card application id, or `"admin"` |
/// | `kind` | `"user"`, `"card"` or `"admin"` |
/// | `exp` | expiration, seconds since UNIX epoch |
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub kind: String,
    pub exp: u64,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Sign a session token for `principal`, valid for [`SESSION_TTL_SECS`].
pub fn issue_session_token(principal: &Principal, secret: &str) -> Result<String, SessionError> {
    let claims = SessionClaims {
        sub: principal.subject().to_owned(),
        kind: principal.kind().to_owned(),
        exp: now_secs() + SESSION_TTL_SECS,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| SessionError::Signing)
}

/// Validate a session cookie value and return the principal it names.
///
/// HS256, `exp` checked with the library's default leeway.
pub fn validate_session_token(token: &str, secret: &str) -> Result<Principal, SessionError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => SessionError::InvalidSignature,
        _ => SessionError::Malformed,
    })?;

    let SessionClaims { sub, kind, .. } = data.claims;
    match kind.as_str() {
        "admin" if sub == ADMIN_SUBJECT => Ok(Principal::Admin),
        "user" => Ok(Principal::User { user_id: sub }),
        "card" => Ok(Principal::Card {
            application_id: sub,
        }),
        _ => Err(SessionError::Malformed),
    }
}
