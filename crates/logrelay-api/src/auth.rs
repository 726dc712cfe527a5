//! Credential extraction and comparison for both entry points.
//!
//! Secrets are compared through their SHA-256 digests so the comparison
//! length never depends on the provided value.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use sha2::{Digest, Sha256};

/// Header carrying the webhook shared secret.
pub const WEBHOOK_AUTH_HEADER: &str = "x-ably-auth";

/// Extracts the token from an `Authorization: Bearer <token>` header.
///
/// Returns `None` when the header is absent, not valid UTF-8, uses another
/// scheme, or carries an empty token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
}

/// Extracts the webhook shared secret header.
pub fn webhook_secret(headers: &HeaderMap) -> Option<&str> {
    headers.get(WEBHOOK_AUTH_HEADER).and_then(|v| v.to_str().ok())
}

/// Checks a provided secret against the configured one.
///
/// An unconfigured secret never matches.
pub fn secret_matches(expected: Option<&str>, provided: &str) -> bool {
    let Some(expected) = expected else { return false };

    let expected_digest = Sha256::digest(expected.as_bytes());
    let provided_digest = Sha256::digest(provided.as_bytes());

    expected_digest
        .iter()
        .zip(provided_digest.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer write-token-1"));

        assert_eq!(bearer_token(&headers), Some("write-token-1"));
    }

    #[test]
    fn rejects_other_schemes_and_empty_tokens() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dGVzdDp0ZXN0"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("write-token-1"));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn padded_token_is_taken_verbatim() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer  write-token-1 "));

        let token = bearer_token(&headers);

        assert_eq!(token, Some(" write-token-1 "));
        assert!(!secret_matches(Some("write-token-1"), token.unwrap()));
    }

    #[test]
    fn secrets_must_match_exactly() {
        assert!(secret_matches(Some("s3cret"), "s3cret"));
        assert!(!secret_matches(Some("s3cret"), "s3cret "));
        assert!(!secret_matches(Some("s3cret"), "S3CRET"));
        assert!(!secret_matches(None, "s3cret"));
        assert!(!secret_matches(None, ""));
    }
}
