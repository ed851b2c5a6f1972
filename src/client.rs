use crate::common::constants::BROWSER_USER_AGENT;
use crate::common::error::{Result, TrackerError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::Url;
use tracing::{debug, warn};

/// A single outbound GET as an adapter wants it issued
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    pub url: Url,
    pub headers: Vec<(&'static str, String)>,
}

impl UpstreamRequest {
    pub fn get(url: Url) -> Self {
        Self {
            url,
            headers: Vec::new(),
        }
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Performs upstream GETs and hands back the response body.
///
/// Non-2xx responses are errors. No retries.
#[async_trait::async_trait]
pub trait HttpFetch: Send + Sync {
    async fn fetch(&self, request: &UpstreamRequest) -> Result<String>;
}

pub struct ReqwestFetcher {
    client: reqwest::Client,
    user_agent: String,
}

impl Default for ReqwestFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ReqwestFetcher {
    pub fn new() -> Self {
        Self::with_user_agent(BROWSER_USER_AGENT)
    }

    /// User agent sent on requests that do not set one themselves
    pub fn with_user_agent(user_agent: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            user_agent: user_agent.into(),
        }
    }

    fn header_map(&self, request: &UpstreamRequest) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| TrackerError::Config(format!("invalid header name {}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| TrackerError::Config(format!("invalid header value for {}: {}", name, e)))?;
            headers.insert(name, value);
        }
        if !headers.contains_key(USER_AGENT) {
            let agent = HeaderValue::from_str(&self.user_agent)
                .map_err(|e| TrackerError::Config(format!("invalid user agent: {}", e)))?;
            headers.insert(USER_AGENT, agent);
        }
        Ok(headers)
    }
}

#[async_trait::async_trait]
impl HttpFetch for ReqwestFetcher {
    async fn fetch(&self, request: &UpstreamRequest) -> Result<String> {
        debug!("GET {}", request.url);
        let response = self
            .client
            .get(request.url.clone())
            .headers(self.header_map(request)?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Upstream {} answered {}", request.url, status);
            return Err(TrackerError::UpstreamStatus {
                status: status.as_u16(),
                url: request.url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let req = UpstreamRequest::get(Url::parse("https://example.com").unwrap())
            .header("x-zip", "12345");
        assert_eq!(req.header_value("X-Zip"), Some("12345"));
        assert_eq!(req.header_value("origin"), None);
    }

    #[test]
    fn test_header_map_adds_browser_user_agent() {
        let req = UpstreamRequest::get(Url::parse("https://example.com").unwrap())
            .header("x-language", "de");
        let headers = ReqwestFetcher::new().header_map(&req).unwrap();
        assert_eq!(headers.get("x-language").unwrap(), "de");
        assert_eq!(headers.get(USER_AGENT).unwrap(), BROWSER_USER_AGENT);
    }

    #[test]
    fn test_header_map_keeps_explicit_user_agent() {
        let req = UpstreamRequest::get(Url::parse("https://example.com").unwrap())
            .header("user-agent", "custom");
        let headers = ReqwestFetcher::with_user_agent("fallback").header_map(&req).unwrap();
        assert_eq!(headers.get(USER_AGENT).unwrap(), "custom");
    }
}
