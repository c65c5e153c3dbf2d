// src/config/models.rs
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;
use url::Url;

pub const DEFAULT_ALLOWED_ORIGIN: &str = "https://dashboard-internal.privacy-safe.io";
pub const DEFAULT_PATH_PREFIX: &str = "/api/lemlist";
pub const DEFAULT_UPSTREAM_BASE: &str = "https://api.lemlist.com/api/";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    /// Never read from the config file, only from the environment.
    #[serde(skip)]
    pub api_key: Option<ApiKey>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    /// Compared byte-for-byte against the inbound `Origin` header.
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
    #[serde(default = "default_path_prefix")]
    pub path_prefix: String,
    #[serde(default = "default_upstream_base")]
    pub upstream_base: String,
    #[serde(default = "default_cache_max_age_secs")]
    pub cache_max_age_secs: u64,
    #[serde(default)]
    pub upstream_timeout_secs: Option<u64>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            allowed_origin: default_allowed_origin(),
            path_prefix: default_path_prefix(),
            upstream_base: default_upstream_base(),
            cache_max_age_secs: default_cache_max_age_secs(),
            upstream_timeout_secs: None,
        }
    }
}

impl ProxyConfig {
    pub fn upstream_timeout(&self) -> Option<Duration> {
        self.upstream_timeout_secs.map(Duration::from_secs)
    }

    pub fn cache_control(&self) -> String {
        format!("public, max-age={}", self.cache_max_age_secs)
    }
}

/// Lemlist API key. Debug output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        let proxy = &self.proxy;

        if proxy.allowed_origin.is_empty() {
            bail!("proxy.allowed_origin must not be empty");
        }
        if hyper::header::HeaderValue::from_str(&proxy.allowed_origin).is_err() {
            bail!("proxy.allowed_origin is not a valid header value");
        }
        if !proxy.path_prefix.starts_with('/') {
            bail!("proxy.path_prefix must start with '/'");
        }

        let base = Url::parse(&proxy.upstream_base).context("Invalid proxy.upstream_base")?;
        if base.scheme() != "http" && base.scheme() != "https" {
            bail!("proxy.upstream_base must be an http(s) URL, got {}", base.scheme());
        }
        if !proxy.upstream_base.ends_with('/') {
            bail!("proxy.upstream_base must end with '/'");
        }

        Ok(())
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_allowed_origin() -> String {
    DEFAULT_ALLOWED_ORIGIN.to_string()
}

fn default_path_prefix() -> String {
    DEFAULT_PATH_PREFIX.to_string()
}

fn default_upstream_base() -> String {
    DEFAULT_UPSTREAM_BASE.to_string()
}

fn default_cache_max_age_secs() -> u64 {
    60
}
