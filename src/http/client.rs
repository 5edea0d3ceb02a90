use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, USER_AGENT};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde_json::Value;

use crate::error::cms::CmsError;
use crate::http::logging_middleware::LoggingMiddleware;
use crate::http::no_cache_middleware::NoCacheMiddleware;

/// Parsed JSON body plus the response headers callers care about.
#[derive(Debug, Clone)]
pub struct JsonResponse {
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl JsonResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// `X-WP-TotalPages`, WordPress' page count for list endpoints.
    pub fn total_pages(&self) -> Option<u32> {
        self.header("x-wp-totalpages")?.trim().parse().ok()
    }
}

/// Anything that can answer a GET with a JSON body.
#[async_trait]
pub trait JsonSource: Send + Sync {
    async fn get_json(&self, url: &str, timeout: Option<Duration>)
    -> Result<JsonResponse, CmsError>;
}

pub struct CmsHttp {
    client: ClientWithMiddleware,
}

impl CmsHttp {
    pub fn new() -> Result<Self, CmsError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).parse()?,
        );
        headers.insert(ACCEPT, "application/json".parse()?);

        let client = Client::builder().default_headers(headers).build()?;
        let client = ClientBuilder::new(client)
            .with(NoCacheMiddleware)
            .with(LoggingMiddleware)
            .build();

        Ok(CmsHttp { client })
    }
}

#[async_trait]
impl JsonSource for CmsHttp {
    async fn get_json(
        &self,
        url: &str,
        timeout: Option<Duration>,
    ) -> Result<JsonResponse, CmsError> {
        let mut request = self.client.get(url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CmsError::status(url, status.as_u16()));
        }

        let headers = response
            .headers()
            .iter()
            .filter(|(key, _)| {
                matches!(key.as_str(), "content-type" | "x-wp-total" | "x-wp-totalpages")
            })
            .map(|(key, value)| (key.to_string(), value.to_str().unwrap_or("").to_string()))
            .collect();

        let bytes = response.bytes().await?;
        let body: Value = serde_json::from_slice(&bytes)?;

        Ok(JsonResponse {
            url: url.to_string(),
            status: status.as_u16(),
            headers,
            body,
        })
    }
}
