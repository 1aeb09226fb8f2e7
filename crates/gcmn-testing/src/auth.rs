//! Mock session helpers for integration tests.
//!
//! Mints a signed session cookie for a chosen principal so tests can call
//! protected routes without going through the login flow.

use axum::http::{HeaderMap, HeaderName, HeaderValue};

use gcmn_auth_types::cookie::GCMN_SESSION;
use gcmn_auth_types::token::{Principal, issue_session_token};

/// Principal whose session cookie is attached to test requests.
pub struct MockSession {
    pub principal: Principal,
}

impl MockSession {
    pub fn admin() -> Self {
        Self {
            principal: Principal::Admin,
        }
    }

    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            principal: Principal::User {
                user_id: user_id.into(),
            },
        }
    }

    pub fn card(application_id: impl Into<String>) -> Self {
        Self {
            principal: Principal::Card {
                application_id: application_id.into(),
            },
        }
    }

    /// `Cookie` header value carrying a token signed with `secret`.
    pub fn cookie(&self, secret: &str) -> String {
        let token = issue_session_token(&self.principal, secret).unwrap();
        format!("{GCMN_SESSION}={token}")
    }

    /// Headers as a browser holding the session would send them.
    pub fn headers(&self, secret: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            HeaderName::from_static("cookie"),
            HeaderValue::from_str(&self.cookie(secret)).unwrap(),
        );
        map
    }
}
