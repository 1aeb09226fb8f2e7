//! Session cookie builders.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::token::SESSION_TTL_SECS;

/// Cookie name carrying the session token.
pub const GCMN_SESSION: &str = "gcmn_session";

fn base_cookie(value: String, domain: Option<String>, max_age: Duration) -> Cookie<'static> {
    let mut builder = Cookie::build((GCMN_SESSION, value))
        .path("/")
        .max_age(max_age)
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax);
    if let Some(domain) = domain {
        builder = builder.domain(domain);
    }
    builder.build()
}

/// Set the session cookie on the jar.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use gcmn_auth_types::cookie::{set_session_cookie, GCMN_SESSION};
///
/// let jar = set_session_cookie(CookieJar::new(), "token".to_string(), None);
/// let cookie = jar.get(GCMN_SESSION).unwrap();
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(86400)));
/// assert!(cookie.http_only().unwrap_or(false));
/// ```
pub fn set_session_cookie(jar: CookieJar, value: String, domain: Option<String>) -> CookieJar {
    jar.add(base_cookie(
        value,
        domain,
        Duration::seconds(SESSION_TTL_SECS as i64),
    ))
}

/// Expire the session cookie.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use gcmn_auth_types::cookie::{clear_session_cookie, set_session_cookie, GCMN_SESSION};
///
/// let jar = set_session_cookie(CookieJar::new(), "token".to_string(), None);
/// let jar = clear_session_cookie(jar, None);
/// let cookie = jar.get(GCMN_SESSION).unwrap();
/// assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
/// assert_eq!(cookie.value(), "");
/// ```
pub fn clear_session_cookie(jar: CookieJar, domain: Option<String>) -> CookieJar {
    jar.add(base_cookie(String::new(), domain, Duration::ZERO))
}
