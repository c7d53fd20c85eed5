use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::COOKIE, request::Parts, HeaderMap, HeaderValue},
};
use std::convert::Infallible;
use tracing::warn;

use super::jwt::{Identity, JwtKeys};

pub const SESSION_COOKIE_NAME: &str = "token";

/// Outcome of resolving the caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Authenticated(Identity),
    Anonymous,
}

impl Session {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Session::Authenticated(identity) => Some(identity),
            Session::Anonymous => None,
        }
    }
}

/// Reads the session cookie and verifies it. A missing or invalid token yields
/// `Anonymous`; deciding the HTTP response is left to the caller.
pub fn resolve(headers: &HeaderMap, keys: &JwtKeys) -> Session {
    let Some(token) = extract_session_token(headers) else {
        return Session::Anonymous;
    };
    match keys.verify(&token) {
        Ok(identity) => Session::Authenticated(identity),
        Err(e) => {
            warn!(error = ?e, "session token rejected");
            Session::Anonymous
        }
    }
}

fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let key = parts.next().unwrap_or_default().trim();
            let val = parts.next().unwrap_or_default().trim();
            if key == SESSION_COOKIE_NAME && !val.is_empty() {
                return Some(val.to_string());
            }
        }
    }
    None
}

/// `HttpOnly; SameSite=Strict` cookie carrying the session token.
pub fn session_cookie(
    token: &str,
    max_age_secs: u64,
    secure: bool,
) -> Result<HeaderValue, axum::http::header::InvalidHeaderValue> {
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Strict; Max-Age={max_age_secs}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        Ok(resolve(&parts.headers, &keys))
    }
}
