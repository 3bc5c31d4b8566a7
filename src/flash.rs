use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::SignedCookieJar;
use serde::{Deserialize, Serialize};

const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
}

/// One-time message surfaced on the next rendered page after a
/// state-changing action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flash {
    pub level: Level,
    pub message: String,
}

/// Queues a flash message for the next page render.
pub fn push(jar: SignedCookieJar, level: Level, message: &str) -> SignedCookieJar {
    let flash = Flash {
        level,
        message: message.to_string(),
    };
    let value = serde_json::to_string(&flash).unwrap_or_default();
    jar.add(Cookie::build((FLASH_COOKIE, value)).path("/").http_only(true))
}

/// Takes the pending flash message, if any, clearing it from the jar.
pub fn pop(jar: SignedCookieJar) -> (SignedCookieJar, Option<Flash>) {
    match jar.get(FLASH_COOKIE) {
        Some(cookie) => {
            let flash = serde_json::from_str(cookie.value()).ok();
            (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), flash)
        }
        None => (jar, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;
    use axum_extra::extract::cookie::Key;

    fn empty_jar() -> SignedCookieJar {
        SignedCookieJar::from_headers(&HeaderMap::new(), Key::derive_from(&[7u8; 64]))
    }

    #[test]
    fn push_then_pop_returns_the_message_once() {
        let jar = push(empty_jar(), Level::Success, "Product added.");
        let (jar, flash) = pop(jar);
        let flash = flash.expect("flash should be present");
        assert_eq!(flash.level, Level::Success);
        assert_eq!(flash.message, "Product added.");

        let (_, flash) = pop(jar);
        assert!(flash.is_none());
    }

    #[test]
    fn pop_on_empty_jar_is_none() {
        let (_, flash) = pop(empty_jar());
        assert!(flash.is_none());
    }
}
