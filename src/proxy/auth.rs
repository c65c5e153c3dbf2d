// src/proxy/auth.rs
use base64::{engine::general_purpose, Engine as _};

use crate::config::ApiKey;

/// Basic auth with an empty user name and the API key as password.
pub fn basic_auth(key: &ApiKey) -> String {
    let credentials = format!(":{}", key.expose());
    format!("Basic {}", general_purpose::STANDARD.encode(credentials))
}
