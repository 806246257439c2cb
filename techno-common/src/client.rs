//! Single outbound call followed by a JSON decode

use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::error::{Call, ClientError, Error, Result};

/// User agent sent with every outbound call
pub(crate) const USER_AGENT: &str = concat!("techno-common/", env!("CARGO_PKG_VERSION"));

/// Build the shared HTTP client
///
/// No timeout is configured; calls wait for the transport default.
pub(crate) fn build_http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| Error::Config(format!("Cannot build HTTP client: {}", e)))
}

/// Append `segments` to `base` as individual path segments
///
/// Each segment is percent-encoded, so `/`, `?` and `#` inside a value stay
/// part of that segment. Empty, `.` and `..` segments are refused.
pub(crate) fn endpoint_url(
    call: Call,
    base: &str,
    segments: &[&str],
) -> std::result::Result<Url, ClientError> {
    if let Some(bad) = segments
        .iter()
        .find(|segment| matches!(**segment, "" | "." | ".."))
    {
        return Err(ClientError::InvalidUrl {
            call,
            reason: format!("path segment {:?} is not allowed", bad),
        });
    }

    let mut url = Url::parse(base).map_err(|e| ClientError::InvalidUrl {
        call,
        reason: e.to_string(),
    })?;
    url.path_segments_mut()
        .map_err(|_| ClientError::InvalidUrl {
            call,
            reason: "base URL cannot carry a path".to_string(),
        })?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

/// Send `request` once and decode the body as `T`
///
/// Non-success statuses count as transport failures. The request URL is
/// stripped from returned errors since it carries secrets and tokens.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    call: Call,
    request: reqwest::RequestBuilder,
) -> std::result::Result<T, ClientError> {
    let response = request
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|source| ClientError::Transport {
            call,
            source: source.without_url(),
        })?;

    tracing::trace!(call = %call, status = response.status().as_u16(), "Response received");

    response
        .json::<T>()
        .await
        .map_err(|source| ClientError::Decode {
            call,
            source: source.without_url(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_appends_segments() {
        let url = endpoint_url(
            Call::CheckSession,
            "http://auth/session/v1/api/",
            &["checkSessionByToken", "tok"],
        )
        .unwrap();
        assert_eq!(url.as_str(), "http://auth/session/v1/api/checkSessionByToken/tok");
    }

    #[test]
    fn test_endpoint_url_base_without_trailing_slash() {
        let url = endpoint_url(Call::Resolve, "http://dir/img", &["hostPrefixVersion", "svc"]).unwrap();
        assert_eq!(url.as_str(), "http://dir/img/hostPrefixVersion/svc");
    }

    #[test]
    fn test_endpoint_url_encodes_reserved_characters() {
        let url = endpoint_url(Call::CheckSession, "http://auth/", &["check", "../x"]).unwrap();
        assert_eq!(url.path(), "/check/..%2Fx");

        let url = endpoint_url(Call::CheckSession, "http://auth/", &["check", "a?b"]).unwrap();
        assert_eq!(url.path(), "/check/a%3Fb");
        assert!(url.query().is_none());

        let url = endpoint_url(Call::CheckSession, "http://auth/", &["check", "a#b"]).unwrap();
        assert_eq!(url.path(), "/check/a%23b");
        assert!(url.fragment().is_none());
    }

    #[test]
    fn test_endpoint_url_refuses_dot_and_empty_segments() {
        for segment in ["", ".", ".."] {
            let err = endpoint_url(Call::CheckSession, "http://auth/", &["check", segment]).unwrap_err();
            assert!(matches!(err, ClientError::InvalidUrl { call: Call::CheckSession, .. }));
        }
    }

    #[test]
    fn test_endpoint_url_rejects_unparseable_base() {
        let err = endpoint_url(Call::Resolve, "not a url", &["svc"]).unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl { call: Call::Resolve, .. }));
    }
}
