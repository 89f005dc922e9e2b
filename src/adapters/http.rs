//! Minimal HTTP client: optional percent-encoded query strings, a browser
//! user agent and byte bodies decoded on demand.

use crate::utils::error::{PluginError, Result};
use crate::utils::validation::{validate_url, Validate};
use reqwest::header::USER_AGENT;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_10_1) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/39.0.2171.95 Safari/537.36";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Percent-encode everything except ASCII alphanumerics and `-._~`.
pub fn percent_encode(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    for byte in input.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            result.push(byte as char);
        } else {
            result.push('%');
            result.push(HEX_DIGITS[(byte >> 4) as usize] as char);
            result.push(HEX_DIGITS[(byte & 0x0F) as usize] as char);
        }
    }
    result
}

pub fn encode_query_string(query: &[(String, String)]) -> String {
    query
        .iter()
        .map(|(key, value)| format!("{}={}", percent_encode(key), percent_encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub encode_query: bool,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::GET,
            headers: Vec::new(),
            query: Vec::new(),
            encode_query: false,
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn encode_query(mut self, encode: bool) -> Self {
        self.encode_query = encode;
        self
    }

    /// The URL with the query appended, encoded or joined raw.
    pub fn full_url(&self) -> String {
        if self.query.is_empty() {
            return self.url.clone();
        }
        let params = if self.encode_query {
            encode_query_string(&self.query)
        } else {
            self.query
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("&")
        };
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.url, separator, params)
    }

    fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
    }
}

impl Validate for HttpRequest {
    fn validate(&self) -> Result<()> {
        validate_url("url", &self.url).map(|_| ())
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub url: String,
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(PluginError::HttpStatus {
                url: self.url,
                status: self.status,
            })
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client })
    }

    /// Send the request. Non-2xx statuses are returned, not raised.
    pub async fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        request.validate()?;
        let url = request.full_url();

        tracing::debug!("Making {} request to: {}", request.method, url);
        let mut builder = self.client.request(request.method.clone(), &url);
        if !request.has_header(USER_AGENT.as_str()) {
            builder = builder.header(USER_AGENT, DEFAULT_USER_AGENT);
        }
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        tracing::debug!("HTTP response status: {}", status);
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse { url, status, body })
    }

    pub async fn get_text(&self, request: &HttpRequest) -> Result<String> {
        Ok(self.send(request).await?.error_for_status()?.text())
    }

    pub async fn get_json<T: DeserializeOwned>(&self, request: &HttpRequest) -> Result<T> {
        self.send(request).await?.error_for_status()?.json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_encode() {
        assert_eq!(percent_encode("hello world"), "hello%20world");
        assert_eq!(percent_encode("a/b?c=d&e"), "a%2Fb%3Fc%3Dd%26e");
        assert_eq!(percent_encode("-._~AZaz09"), "-._~AZaz09");
        assert_eq!(percent_encode("é"), "%C3%A9");
        assert_eq!(percent_encode("2024-01-01T00:00:00"), "2024-01-01T00%3A00%3A00");
    }

    #[test]
    fn test_encode_query_string_keeps_order() {
        let query = vec![
            ("q".to_string(), "San Jose, CA".to_string()),
            ("limit".to_string(), "20".to_string()),
        ];
        assert_eq!(encode_query_string(&query), "q=San%20Jose%2C%20CA&limit=20");
    }

    #[test]
    fn test_full_url() {
        let raw = HttpRequest::get("https://example.com/query")
            .query("format", "geojson")
            .query("limit", 5);
        assert_eq!(raw.full_url(), "https://example.com/query?format=geojson&limit=5");

        let encoded = HttpRequest::get("https://example.com/query?x=1")
            .query("place", "a b")
            .encode_query(true);
        assert_eq!(encoded.full_url(), "https://example.com/query?x=1&place=a%20b");

        assert_eq!(HttpRequest::get("https://example.com").full_url(), "https://example.com");
    }

    #[test]
    fn test_request_validation() {
        assert!(HttpRequest::get("https://ifconfig.io").validate().is_ok());
        assert!(HttpRequest::get("ifconfig.io").validate().is_err());
    }
}
