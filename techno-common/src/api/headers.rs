//! Credential headers on inbound and forwarded requests
//!
//! Works on `http::HeaderMap`, which both axum requests and reqwest requests
//! expose, so the same helpers read an inbound request and prepare a
//! downstream one.
//!
//! The bearer token and the service profile travel in separate headers:
//! `Authorization: <scheme> <token>` and `ServiceProfile: <profile> <action>`.

use axum::http::header::{AsHeaderName, HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};

use crate::api::types::ServiceProfile;
use crate::error::ClientError;

const SERVICE_PROFILE: &str = "serviceprofile";

/// Header carrying `"<profile> <action>"` (`ServiceProfile` on the wire)
pub const SERVICE_PROFILE_HEADER: HeaderName = HeaderName::from_static(SERVICE_PROFILE);

/// Scheme written by [`inject_token`]
pub const BEARER_SCHEME: &str = "Bearer";

fn header_str<K: AsHeaderName>(headers: &HeaderMap, name: K) -> Option<&str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Credential following the scheme in the `Authorization` header
///
/// Returns an empty string when the header is absent, unreadable, or has no
/// second space-separated field.
///
/// # Examples
///
/// ```
/// use axum::http::{HeaderMap, HeaderValue, header::AUTHORIZATION};
/// use techno_common::api::headers::extract_token;
///
/// let mut headers = HeaderMap::new();
/// headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
/// assert_eq!(extract_token(&headers), "abc123");
/// ```
pub fn extract_token(headers: &HeaderMap) -> String {
    header_str(headers, AUTHORIZATION)
        .and_then(|raw| raw.split(' ').nth(1))
        .unwrap_or_default()
        .to_string()
}

/// Service profile from the `ServiceProfile` header
///
/// The value must be exactly two space-separated fields. Anything else
/// yields the empty profile.
pub fn extract_service_profile(headers: &HeaderMap) -> ServiceProfile {
    let Some(raw) = header_str(headers, SERVICE_PROFILE_HEADER) else {
        return ServiceProfile::default();
    };

    let mut fields = raw.split(' ');
    match (fields.next(), fields.next(), fields.next()) {
        (Some(profile), Some(action), None) => ServiceProfile::new(profile, action),
        _ => ServiceProfile::default(),
    }
}

/// Write `Authorization: Bearer <token>`, replacing any previous value
pub fn inject_token(headers: &mut HeaderMap, token: &str) -> Result<(), ClientError> {
    let value = HeaderValue::from_str(&format!("{} {}", BEARER_SCHEME, token))
        .map_err(|e| ClientError::InvalidHeader(format!("{}: {}", AUTHORIZATION, e)))?;
    headers.insert(AUTHORIZATION, value);
    Ok(())
}

/// Write `ServiceProfile: <profile> <action>`, replacing any previous value
pub fn inject_service_profile(
    headers: &mut HeaderMap,
    profile: &ServiceProfile,
) -> Result<(), ClientError> {
    let value = HeaderValue::from_str(&format!("{} {}", profile.profile, profile.action))
        .map_err(|e| ClientError::InvalidHeader(format!("{}: {}", SERVICE_PROFILE, e)))?;
    headers.insert(SERVICE_PROFILE_HEADER, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;

    fn headers_with(name: &'static str, value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_extract_token_bearer() {
        let headers = headers_with("authorization", "Bearer X");
        assert_eq!(extract_token(&headers), "X");
    }

    #[test]
    fn test_extract_token_any_scheme() {
        let headers = headers_with("authorization", "Token 9f8e7d");
        assert_eq!(extract_token(&headers), "9f8e7d");
    }

    #[test]
    fn test_extract_token_missing_or_malformed() {
        assert_eq!(extract_token(&HeaderMap::new()), "");
        assert_eq!(extract_token(&headers_with("authorization", "")), "");
        assert_eq!(extract_token(&headers_with("authorization", "Bearer")), "");
        assert_eq!(extract_token(&headers_with("authorization", "Bearer ")), "");
    }

    #[test]
    fn test_extract_token_takes_second_field_only() {
        let headers = headers_with("authorization", "Bearer abc trailing");
        assert_eq!(extract_token(&headers), "abc");
    }

    #[test]
    fn test_extract_service_profile() {
        let headers = headers_with("serviceprofile", "walk read");
        assert_eq!(
            extract_service_profile(&headers),
            ServiceProfile::new("walk", "read")
        );
    }

    #[test]
    fn test_extract_service_profile_malformed() {
        assert!(extract_service_profile(&HeaderMap::new()).is_empty());
        assert!(extract_service_profile(&headers_with("serviceprofile", "walk")).is_empty());
        assert!(extract_service_profile(&headers_with("serviceprofile", "a b c")).is_empty());
    }

    #[test]
    fn test_inject_token_writes_authorization() {
        let mut headers = HeaderMap::new();
        inject_token(&mut headers, "abc").unwrap();

        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc");
        assert!(headers.get(SERVICE_PROFILE_HEADER).is_none());
        assert_eq!(extract_token(&headers), "abc");
    }

    #[test]
    fn test_inject_token_and_profile_use_separate_slots() {
        let mut headers = HeaderMap::new();
        let profile = ServiceProfile::new("medical", "write");
        inject_service_profile(&mut headers, &profile).unwrap();
        inject_token(&mut headers, "tok").unwrap();

        assert_eq!(extract_token(&headers), "tok");
        assert_eq!(extract_service_profile(&headers), profile);
    }

    #[test]
    fn test_inject_replaces_previous_value() {
        let mut headers = HeaderMap::new();
        inject_token(&mut headers, "old").unwrap();
        inject_token(&mut headers, "new").unwrap();

        assert_eq!(headers.get_all(AUTHORIZATION).iter().count(), 1);
        assert_eq!(extract_token(&headers), "new");
    }

    #[test]
    fn test_inject_rejects_control_characters() {
        let mut headers = HeaderMap::new();
        let err = inject_token(&mut headers, "bad\ntoken").unwrap_err();

        assert!(matches!(err, ClientError::InvalidHeader(_)));
        assert!(headers.is_empty());
    }

    #[test]
    fn test_inject_service_profile_error_names_header() {
        let mut headers = HeaderMap::new();
        let err = inject_service_profile(&mut headers, &ServiceProfile::new("walk", "re\nad"))
            .unwrap_err();

        match err {
            ClientError::InvalidHeader(message) => assert!(message.starts_with("serviceprofile:")),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(headers.get(SERVICE_PROFILE_HEADER).is_none());
    }

    #[test]
    fn test_service_profile_request_round_trip() {
        let profile = ServiceProfile::new("recipe", "update");
        let mut request = Request::builder()
            .uri("/downstream")
            .body(Body::empty())
            .unwrap();

        inject_service_profile(request.headers_mut(), &profile).unwrap();

        assert_eq!(extract_service_profile(request.headers()), profile);
    }
}
