use axum::http::{header, HeaderMap};
use subtle::ConstantTimeEq;

/// Name of the cookie carrying the admin session key
pub const SESSION_COOKIE: &str = "admin_session";

/// Constant-time string comparison to prevent timing attacks
/// Use this for comparing the admin token and other sensitive values
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Check a submitted admin token against the configured one.
/// Always false when no token is configured.
pub fn verify_admin_token(configured: Option<&str>, submitted: &str) -> bool {
    match configured {
        Some(expected) => constant_time_compare(expected, submitted.trim()),
        None => false,
    }
}

/// Read a cookie value from the request headers
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
        .filter(|v| !v.is_empty())
}

/// `Set-Cookie` value that stores the admin session
pub fn session_cookie(key: &str) -> String {
    format!(
        "{}={}; Path=/admin; HttpOnly; SameSite=Lax",
        SESSION_COOKIE, key
    )
}

/// `Set-Cookie` value that clears the admin session
pub fn expired_session_cookie() -> String {
    format!(
        "{}=; Path=/admin; HttpOnly; SameSite=Lax; Max-Age=0",
        SESSION_COOKIE
    )
}
