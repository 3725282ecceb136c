//! Responses produced by the interceptor.

use bytes::Bytes;
use kiteshell_core::CachedEntry;
use serde::Serialize;
use std::borrow::Cow;
use tokio::task::JoinHandle;

use super::classify::Policy;
use crate::fetch::{FetchResponse, Request, Url};

/// Body of the synthetic response served when neither network nor cache can answer.
pub const OFFLINE_BODY: &str = "Offline";

/// A response snapshot, whether it came from the network or a partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellResponse {
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl ShellResponse {
    /// Synthetic `503 Offline`.
    pub fn offline(url: &Url) -> Self {
        Self {
            url: url.to_string(),
            status: 503,
            headers: vec![("content-type".into(), "text/plain; charset=utf-8".into())],
            body: Bytes::from_static(OFFLINE_BODY.as_bytes()),
        }
    }

    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Snapshot this response as a cache entry for `request`.
    pub fn to_entry(&self, request: &Request) -> CachedEntry {
        CachedEntry {
            key: request.cache_key(),
            method: request.method.as_str().to_string(),
            url: request.url.to_string(),
            status: self.status,
            headers: self.headers.clone(),
            body: self.body.to_vec(),
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl From<FetchResponse> for ShellResponse {
    fn from(response: FetchResponse) -> Self {
        let headers = response
            .headers
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
            .collect();

        Self { url: response.final_url.to_string(), status: response.status.as_u16(), headers, body: response.bytes }
    }
}

impl From<CachedEntry> for ShellResponse {
    fn from(entry: CachedEntry) -> Self {
        Self { url: entry.url, status: entry.status, headers: entry.headers, body: Bytes::from(entry.body) }
    }
}

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    Cache,
    Network,
    Offline,
    /// The interceptor declined the request and the host fetched it directly.
    Passthrough,
}

/// Result of running a request through a policy.
#[derive(Debug)]
pub struct Outcome {
    pub response: ShellResponse,
    pub source: ResponseSource,
    /// None for pass-through requests.
    pub policy: Option<Policy>,
    /// Background refresh started by stale-while-revalidate, if any.
    pub revalidation: Option<JoinHandle<()>>,
}

impl Outcome {
    pub(crate) fn new(response: ShellResponse, source: ResponseSource, policy: Policy) -> Self {
        Self { response, source, policy: Some(policy), revalidation: None }
    }

    pub(crate) fn offline(request: &Request, policy: Policy) -> Self {
        Self::new(ShellResponse::offline(&request.url), ResponseSource::Offline, policy)
    }

    /// Wait for any background refresh to finish.
    pub async fn settle(&mut self) {
        if let Some(handle) = self.revalidation.take()
            && let Err(e) = handle.await
        {
            tracing::warn!(error = %e, "revalidation task did not complete");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{StatusCode, header};

    #[test]
    fn test_offline_response() {
        let url = Url::parse("https://bakardykite.com/img/Bakar.jpeg").unwrap();
        let response = ShellResponse::offline(&url);
        assert_eq!(response.status, 503);
        assert_eq!(response.body_text(), "Offline");
        assert!(!response.is_ok());
        assert_eq!(response.header("Content-Type"), Some("text/plain; charset=utf-8"));
    }

    #[test]
    fn test_from_fetch_response() {
        let url = Url::parse("https://bakardykite.com/api/schedule").unwrap();
        let mut headers = header::HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, header::HeaderValue::from_static("application/json"));
        let fetched = FetchResponse {
            url: url.clone(),
            final_url: url,
            status: StatusCode::OK,
            bytes: Bytes::from_static(b"[]"),
            headers,
            fetch_ms: 3,
        };

        let response = ShellResponse::from(fetched);
        assert!(response.is_ok());
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.body_text(), "[]");
    }

    #[test]
    fn test_entry_conversion_keeps_snapshot() {
        let url = Url::parse("https://bakardykite.com/favicon.svg").unwrap();
        let request = Request::get(url.clone());
        let response = ShellResponse {
            url: url.to_string(),
            status: 200,
            headers: vec![("content-type".into(), "image/svg+xml".into())],
            body: Bytes::from_static(b"<svg/>"),
        };

        let entry = response.to_entry(&request);
        assert_eq!(entry.key, request.cache_key());
        assert_eq!(entry.method, "GET");
        assert_eq!(ShellResponse::from(entry), response);
    }
}
