use axum::http::{header::USER_AGENT, HeaderMap};
use base64ct::{Base64UrlUnpadded, Encoding};
use rand::RngCore;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::{net::IpAddr, sync::OnceLock};

/// Entropy of opaque single-use and refresh lookup tokens.
pub const OPAQUE_TOKEN_BYTES: usize = 32;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[must_use]
pub fn valid_email(email: &str) -> bool {
    let re = EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid")
    });
    re.is_match(email)
}

/// Generate an opaque token from OS randomness, base64url-encoded.
#[must_use]
pub fn generate_opaque_token() -> String {
    let mut bytes = [0u8; OPAQUE_TOKEN_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    Base64UrlUnpadded::encode_string(&bytes)
}

/// SHA-256 digest of a token, the only form stored at rest.
#[must_use]
pub fn hash_token(token: &str) -> Vec<u8> {
    Sha256::digest(token.as_bytes()).to_vec()
}

#[must_use]
pub fn build_verify_url(base_url: &str, token: &str) -> String {
    format!("{}/verify-email?token={token}", base_url.trim_end_matches('/'))
}

#[must_use]
pub fn build_reset_url(base_url: &str, token: &str) -> String {
    format!(
        "{}/reset-password?token={token}",
        base_url.trim_end_matches('/')
    )
}

/// Best-effort client address: first `X-Forwarded-For` hop, then `X-Real-IP`.
#[must_use]
pub fn client_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .and_then(|value| value.parse().ok());

    if forwarded.is_some() {
        return forwarded;
    }

    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

#[must_use]
pub fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn test_valid_email() {
        assert!(valid_email("alice@example.com"));
        assert!(valid_email("a.b+c@sub.example.org"));
        assert!(!valid_email("alice"));
        assert!(!valid_email("alice@example"));
        assert!(!valid_email("a lice@example.com"));
        assert!(!valid_email("alice@@example.com"));
    }

    #[test]
    fn test_generate_opaque_token() {
        let first = generate_opaque_token();
        let second = generate_opaque_token();

        // 32 bytes -> 43 chars of unpadded base64url
        assert_eq!(first.len(), 43);
        assert_ne!(first, second);
    }

    #[test]
    fn test_hash_token_is_deterministic() {
        let a = hash_token("some-token");
        let b = hash_token("some-token");
        let c = hash_token("other-token");

        assert_eq!(a.len(), 32);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_build_urls_trim_trailing_slash() {
        assert_eq!(
            build_verify_url("https://auth.example.com/", "tok"),
            "https://auth.example.com/verify-email?token=tok"
        );
        assert_eq!(
            build_reset_url("https://auth.example.com", "tok"),
            "https://auth.example.com/reset-password?token=tok"
        );
    }

    #[test]
    fn test_client_ip_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );

        assert_eq!(client_ip(&headers), "203.0.113.7".parse().ok());
    }

    #[test]
    fn test_client_ip_real_ip_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("2001:db8::1"));

        assert_eq!(client_ip(&headers), "2001:db8::1".parse().ok());
    }

    #[test]
    fn test_client_ip_absent() {
        let headers = HeaderMap::new();
        assert_eq!(client_ip(&headers), None);
    }

    #[test]
    fn test_user_agent() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("curl/8.0"));

        assert_eq!(user_agent(&headers), Some("curl/8.0".to_string()));
    }
}
