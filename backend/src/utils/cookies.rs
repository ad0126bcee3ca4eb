//! Cookie helpers for the token transport.
//!
//! Both tokens travel as http-only, secure cookies for browser clients;
//! non-browser clients use the Authorization header or the request body
//! instead. Only the two auth cookies are ever set, so a small builder and
//! parser cover the whole need.

use axum::http::HeaderMap;
use axum::http::header::COOKIE;

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Build a Set-Cookie value for an auth token.
pub fn auth_cookie(name: &str, value: &str, max_age_seconds: i64) -> String {
    format!("{name}={value}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={max_age_seconds}")
}

/// Build a Set-Cookie value that expires an auth cookie immediately.
pub fn expired_cookie(name: &str) -> String {
    format!("{name}=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0")
}

/// Read a cookie value from the request headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(COOKIE)?.to_str().ok()?;

    raw.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        if key == name && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn parses_cookie_among_several() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; accessToken=abc.def.ghi; other=1"),
        );

        assert_eq!(
            cookie_value(&headers, ACCESS_TOKEN_COOKIE).as_deref(),
            Some("abc.def.ghi")
        );
        assert_eq!(cookie_value(&headers, REFRESH_TOKEN_COOKIE), None);
    }

    #[test]
    fn empty_value_counts_as_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("accessToken="));

        assert_eq!(cookie_value(&headers, ACCESS_TOKEN_COOKIE), None);
    }

    #[test]
    fn cookie_attributes() {
        let cookie = auth_cookie(ACCESS_TOKEN_COOKIE, "tok", 900);

        assert!(cookie.starts_with("accessToken=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("Max-Age=900"));
    }
}
