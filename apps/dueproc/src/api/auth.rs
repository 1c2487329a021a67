//! Bearer-token gate for the HTTP API.
//!
//! Off unless `DUEPROC_API_KEY` holds a non-empty key. When on, every route
//! but `/health` needs `Authorization: Bearer <key>`; the bare key is
//! accepted too.

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

/// Configured key, `None` when auth is off.
pub fn get_api_key_from_env() -> Option<String> {
    std::env::var("DUEPROC_API_KEY")
        .ok()
        .filter(|k| !k.is_empty())
}

/// Constant-time key comparison. Inputs are zero-padded to a common length
/// first; the length check happens after the byte comparison.
fn keys_match(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();

    let max_len = provided.len().max(expected.len());
    let mut padded_provided = vec![0u8; max_len];
    let mut padded_expected = vec![0u8; max_len];
    padded_provided[..provided.len()].copy_from_slice(provided);
    padded_expected[..expected.len()].copy_from_slice(expected);

    let bytes_match: bool = padded_provided.ct_eq(&padded_expected).into();
    bytes_match && provided.len() == expected.len()
}

/// Token carried by the `Authorization` header, with or without the
/// `Bearer ` scheme.
fn presented_token(request: &Request<Body>) -> Option<&str> {
    let value = request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    Some(value.strip_prefix("Bearer ").unwrap_or(value))
}

pub async fn api_key_auth_middleware(
    request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, &'static str)> {
    let Some(expected) = get_api_key_from_env() else {
        return Ok(next.run(request).await);
    };
    if request.uri().path() == "/health" {
        return Ok(next.run(request).await);
    }

    let reason = match presented_token(&request) {
        Some(token) if keys_match(token, &expected) => return Ok(next.run(request).await),
        Some(_) => "invalid_api_key",
        None => "missing_authorization_header",
    };
    tracing::warn!(event = "auth_failure", reason, path = %request.uri().path(), "request rejected");
    Err((StatusCode::UNAUTHORIZED, "Unauthorized"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn equal_keys_match() {
        assert!(keys_match("s3cret", "s3cret"));
    }

    fn with_header(value: &str) -> Request<Body> {
        Request::builder()
            .uri("/stages")
            .header(header::AUTHORIZATION, value)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn token_with_or_without_scheme() {
        assert_eq!(presented_token(&with_header("Bearer abc")), Some("abc"));
        assert_eq!(presented_token(&with_header("abc")), Some("abc"));
        let bare = Request::builder().uri("/stages").body(Body::empty()).unwrap();
        assert_eq!(presented_token(&bare), None);
    }

    #[test]
    fn prefix_does_not_match() {
        assert!(!keys_match("s3c", "s3cret"));
        assert!(!keys_match("s3cret-and-more", "s3cret"));
        assert!(!keys_match("", "s3cret"));
    }
}
