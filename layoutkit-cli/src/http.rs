//! HTTP transport backed by `reqwest`.

use std::time::Duration;

use anyhow::Context;
use layoutkit::{ErrorSet, Transport, TransportError};
use reqwest::{
    Client,
    header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde_json::Value;

use crate::config::ApiConfig;

/// [`Transport`] speaking JSON over HTTP.
///
/// Relative endpoints are resolved against `api.base_url`. A rejected post is
/// decoded from the server's `{"errors": {...}}` body when present.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Option<String>,
}

impl HttpTransport {
    /// Creates a client from the API settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value or the client
    /// cannot be built.
    pub fn new(api: &ApiConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &api.token {
            let value = HeaderValue::from_str(&format!("Token {token}")).context("Invalid API token")?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(headers)
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {e}"))?;

        Ok(Self {
            client,
            base_url: api.base_url.clone(),
        })
    }

    /// Absolute URL for `endpoint`.
    pub fn url(&self, endpoint: &str) -> String {
        let absolute = endpoint.starts_with("http://") || endpoint.starts_with("https://");
        match &self.base_url {
            Some(base) if !absolute => format!(
                "{}/{}",
                base.trim_end_matches('/'),
                endpoint.trim_start_matches('/')
            ),
            _ => endpoint.to_string(),
        }
    }
}

fn parse_body(bytes: &[u8]) -> Result<Value, serde_json::Error> {
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes)
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<Value, TransportError> {
        let url = self.url(url);
        debug!("GET {url}");

        let request_err = |e: reqwest::Error| TransportError::Request {
            url: url.clone(),
            message: e.to_string(),
        };
        let response = self.client.get(&url).send().await.map_err(request_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(request_err)?;
        parse_body(&bytes).map_err(|source| TransportError::Decode { url, source })
    }

    async fn post(&self, url: &str, payload: &Value) -> Result<Value, ErrorSet> {
        let url = self.url(url);
        debug!("POST {url}");

        let body = serde_json::to_vec(payload).map_err(|e| ErrorSet::single("err", e.to_string()))?;
        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| ErrorSet::single("err", e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ErrorSet::single("err", e.to_string()))?;

        if !status.is_success() {
            let errors = parse_body(&bytes)
                .ok()
                .and_then(|b| ErrorSet::from_body(&b))
                .unwrap_or_else(|| ErrorSet::single("err", format!("HTTP error {status}: {url}")));
            return Err(errors);
        }

        parse_body(&bytes).map_err(|e| ErrorSet::single("err", e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_join() {
        let t = HttpTransport::new(&ApiConfig {
            base_url: Some("http://localhost:3000/api/".into()),
            token: Some("abc".into()),
        })
        .unwrap();
        assert_eq!(t.url("/users"), "http://localhost:3000/api/users");
        assert_eq!(t.url("users?q=a"), "http://localhost:3000/api/users?q=a");
        assert_eq!(t.url("https://other/x"), "https://other/x");

        let bare = HttpTransport::new(&ApiConfig::default()).unwrap();
        assert_eq!(bare.url("/users"), "/users");
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(b"").unwrap(), Value::Null);
        assert_eq!(parse_body(br#"{"a":1}"#).unwrap()["a"], 1);
        assert!(parse_body(b"<html>").is_err());
    }
}
