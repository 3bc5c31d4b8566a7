use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::Redirect,
};
use axum_extra::extract::cookie::{Cookie, Key};
use axum_extra::extract::SignedCookieJar;

const SESSION_COOKIE: &str = "session";

/// Identity of the logged-in user, carried in a signed cookie between
/// requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub user_id: i64,
}

impl Session {
    /// Reads the session out of the jar without consuming it. Absent,
    /// tampered or garbled cookies all read as "not logged in".
    pub fn peek(jar: &SignedCookieJar) -> Option<Session> {
        let cookie = jar.get(SESSION_COOKIE)?;
        let user_id = cookie.value().parse().ok()?;
        Some(Session { user_id })
    }

    /// Stores the session in the jar after a successful login.
    pub fn store(self, jar: SignedCookieJar) -> SignedCookieJar {
        jar.add(
            Cookie::build((SESSION_COOKIE, self.user_id.to_string()))
                .path("/")
                .http_only(true),
        )
    }

    /// Drops the session cookie; safe to call when none exists.
    pub fn clear(jar: SignedCookieJar) -> SignedCookieJar {
        jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
    }
}

/// Gate applied to every route except register/login/logout: requests
/// without an active session are redirected to the login page.
pub struct RequireSession(pub Session);

#[async_trait]
impl<S> FromRequestParts<S> for RequireSession
where
    S: Send + Sync,
    Key: FromRef<S>,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = match SignedCookieJar::from_request_parts(parts, state).await {
            Ok(jar) => jar,
            Err(never) => match never {},
        };
        Session::peek(&jar)
            .map(RequireSession)
            .ok_or_else(|| Redirect::to("/login"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;

    fn empty_jar() -> SignedCookieJar {
        SignedCookieJar::from_headers(&HeaderMap::new(), Key::derive_from(&[7u8; 64]))
    }

    #[test]
    fn store_then_peek_roundtrip() {
        let jar = Session { user_id: 42 }.store(empty_jar());
        assert_eq!(Session::peek(&jar), Some(Session { user_id: 42 }));
    }

    #[test]
    fn peek_on_empty_jar_is_none() {
        assert_eq!(Session::peek(&empty_jar()), None);
    }

    #[test]
    fn clear_is_idempotent() {
        let jar = Session { user_id: 42 }.store(empty_jar());
        let jar = Session::clear(jar);
        assert_eq!(Session::peek(&jar), None);
        let jar = Session::clear(jar);
        assert_eq!(Session::peek(&jar), None);
    }
}
