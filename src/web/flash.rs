//! One-shot flash messages, carried in a cookie from a redirecting handler
//! to the next rendered page.

use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};

const FLASH_COOKIE: &str = "cardhub_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
    Warning,
    Info,
}

impl FlashLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Error => "error",
            FlashLevel::Warning => "warning",
            FlashLevel::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Warning,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Info,
            message: message.into(),
        }
    }
}

/// Queue a flash for the next rendered page.
pub fn push(jar: CookieJar, flash: &Flash) -> CookieJar {
    let value = serde_json::to_string(flash).unwrap_or_default();
    let cookie = Cookie::build((FLASH_COOKIE, value))
        .path("/")
        .http_only(true)
        .build();
    jar.add(cookie)
}

/// Read and clear the pending flash, if any.
pub fn take(jar: CookieJar) -> (CookieJar, Option<Flash>) {
    let flash = jar
        .get(FLASH_COOKIE)
        .and_then(|c| serde_json::from_str(c.value()).ok());
    let jar = jar.remove(Cookie::build((FLASH_COOKIE, "")).path("/").build());
    (jar, flash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pushed_flash_is_taken_once() {
        let jar = push(CookieJar::new(), &Flash::success("Saved."));

        let (jar, flash) = take(jar);
        assert_eq!(flash, Some(Flash::success("Saved.")));

        // The returned jar carries the removal; a fresh read finds nothing.
        assert!(jar.get(FLASH_COOKIE).map(|c| c.value().is_empty()).unwrap_or(true));
    }

    #[test]
    fn garbage_cookie_yields_no_flash() {
        let jar = CookieJar::new().add(Cookie::new(FLASH_COOKIE, "not json"));
        let (_, flash) = take(jar);
        assert!(flash.is_none());
    }

    #[test]
    fn levels_render_as_severity_strings() {
        assert_eq!(FlashLevel::Success.as_str(), "success");
        assert_eq!(FlashLevel::Error.as_str(), "error");
        assert_eq!(FlashLevel::Warning.as_str(), "warning");
        assert_eq!(FlashLevel::Info.as_str(), "info");
    }
}
