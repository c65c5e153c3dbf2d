// ────────────────────────────────
// src/proxy/proxy.rs
// Credential-injecting proxy in front of the Lemlist API
// ────────────────────────────────

use hyper::body::Bytes;
use hyper::header::{HeaderName, HeaderValue, ORIGIN};
use hyper::{Body, Method, Request, Response, StatusCode};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::auth::basic_auth;
use super::cors::{self, resolve_allow_origin};
use super::route::upstream_url;
use super::upstream::Upstream;
use super::ProxyError;
use crate::config::{ApiKey, ProxyConfig};

const JSON: &str = "application/json";

/// The parts of an inbound request the proxy looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub origin: Option<String>,
}

impl InboundRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            query: None,
            origin: None,
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn from_hyper<B>(req: &Request<B>) -> Self {
        Self {
            method: req.method().as_str().to_string(),
            path: req.uri().path().to_string(),
            query: req.uri().query().map(str::to_owned),
            // A non-ASCII origin can never equal the allowed one.
            origin: req
                .headers()
                .get(ORIGIN)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundResponse {
    pub status: StatusCode,
    pub headers: Vec<(&'static str, HeaderValue)>,
    pub body: Bytes,
}

/// Encode text headers. Values that are not valid header values are dropped
/// rather than failing the request.
fn header_values(pairs: Vec<(&'static str, String)>) -> Vec<(&'static str, HeaderValue)> {
    pairs
        .into_iter()
        .filter_map(|(name, value)| match HeaderValue::from_str(&value) {
            Ok(value) => Some((name, value)),
            Err(e) => {
                warn!(header = name, %e, "dropping invalid response header");
                None
            }
        })
        .collect()
}

impl OutboundResponse {
    fn error(err: &ProxyError, allow_origin: &str) -> Self {
        let mut headers = vec![
            ("Access-Control-Allow-Origin", allow_origin.to_string()),
            ("Content-Type", JSON.to_string()),
        ];
        if matches!(err, ProxyError::MethodNotAllowed) {
            headers.push(("Allow", cors::ALLOW_METHODS.to_string()));
        }
        Self {
            status: err.status(),
            headers: header_values(headers),
            body: Bytes::from(err.body()),
        }
    }

    /// Header value as text; `None` if absent or not visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .and_then(|(_, v)| v.to_str().ok())
    }

    pub fn into_response(self) -> Response<Body> {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        for (name, value) in self.headers {
            match HeaderName::from_bytes(name.as_bytes()) {
                Ok(name) => {
                    headers.insert(name, value);
                }
                Err(e) => warn!(header = name, %e, "dropping invalid response header"),
            }
        }
        response
    }
}

pub struct Proxy {
    config: ProxyConfig,
    api_key: Option<ApiKey>,
    upstream: Arc<dyn Upstream>,
}

impl Proxy {
    pub fn new(config: ProxyConfig, api_key: Option<ApiKey>, upstream: Arc<dyn Upstream>) -> Self {
        Self {
            config,
            api_key,
            upstream,
        }
    }

    pub async fn handle(&self, req: Request<Body>) -> Response<Body> {
        let inbound = InboundRequest::from_hyper(&req);
        self.handle_inbound(&inbound).await.into_response()
    }

    pub async fn handle_inbound(&self, req: &InboundRequest) -> OutboundResponse {
        let allow_origin = resolve_allow_origin(req.origin.as_deref(), &self.config.allowed_origin);

        if req.method == Method::OPTIONS.as_str() {
            debug!(allow_origin, "answering preflight");
            return OutboundResponse {
                status: StatusCode::NO_CONTENT,
                headers: header_values(cors::preflight_headers(allow_origin)),
                body: Bytes::new(),
            };
        }

        match self.forward(req, allow_origin).await {
            Ok(response) => response,
            Err(err) => {
                warn!(status = err.status().as_u16(), %err, "request failed");
                OutboundResponse::error(&err, allow_origin)
            }
        }
    }

    async fn forward(
        &self,
        req: &InboundRequest,
        allow_origin: &str,
    ) -> Result<OutboundResponse, ProxyError> {
        if req.method != Method::GET.as_str() {
            return Err(ProxyError::MethodNotAllowed);
        }

        let url = upstream_url(
            &self.config.upstream_base,
            &self.config.path_prefix,
            &req.path,
            req.query.as_deref(),
        );

        let api_key = self.api_key.as_ref().ok_or(ProxyError::MissingApiKey)?;
        let authorization = basic_auth(api_key);

        let start = Instant::now();
        let upstream = self.upstream.get(&url, &authorization).await?;
        info!(
            status = upstream.status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "upstream responded"
        );

        let mut headers = header_values(vec![
            ("Access-Control-Allow-Origin", allow_origin.to_string()),
            ("Vary", "Origin".to_string()),
            ("Cache-Control", self.config.cache_control()),
        ]);
        // Relayed as raw bytes, even when not visible ASCII.
        headers.push((
            "Content-Type",
            upstream
                .content_type
                .unwrap_or_else(|| HeaderValue::from_static(JSON)),
        ));

        Ok(OutboundResponse {
            status: upstream.status,
            headers,
            body: upstream.body,
        })
    }
}
