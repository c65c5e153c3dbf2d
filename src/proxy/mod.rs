// src/proxy/mod.rs
mod auth;
mod cors;
mod error;
mod proxy;
mod route;
mod upstream;

pub use auth::basic_auth;
pub use cors::resolve_allow_origin;
pub use error::ProxyError;
pub use proxy::{InboundRequest, OutboundResponse, Proxy};
pub use route::{relative_path, upstream_url};
pub use upstream::{HttpUpstream, Upstream, UpstreamResponse};
