// src/proxy/upstream.rs
// Outbound call to the Lemlist API.

use async_trait::async_trait;
use hyper::body::Bytes;
use hyper::header::HeaderValue;
use hyper::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;

use super::ProxyError;

/// Fully-read upstream answer. Any status, including 4xx/5xx, is a response.
///
/// Content type and body are kept as raw bytes; nothing is decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

#[async_trait]
pub trait Upstream: Send + Sync {
    /// Issue one GET. `Err` only when no complete response was obtained.
    async fn get(&self, url: &str, authorization: &str) -> Result<UpstreamResponse, ProxyError>;
}

#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: Client,
}

impl HttpUpstream {
    pub fn new(timeout: Option<Duration>) -> reqwest::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn get(&self, url: &str, authorization: &str) -> Result<UpstreamResponse, ProxyError> {
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, authorization)
            .header(CONTENT_TYPE, "application/json")
            .header("X-Requested-With", "XMLHttpRequest")
            .send()
            .await?;

        // reqwest 0.11 and hyper 0.14 share the same `http` crate.
        let status = response.status();
        let content_type = response.headers().get(CONTENT_TYPE).cloned();
        let body = response.bytes().await?;

        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }
}
