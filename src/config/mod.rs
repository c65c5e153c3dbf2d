// src/config/mod.rs
mod models;

pub use models::*;

use anyhow::{Context, Result};
use std::path::Path;

pub const API_KEY_ENV: &str = "LEMLIST_API_KEY";
pub const LISTEN_ADDR_ENV: &str = "LEMLIST_PROXY_LISTEN";

/// Load configuration from a file (YAML or JSON)
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .context("Failed to read config file")?;

    let config = parse_config(path, &contents)?;
    config.validate()?;
    Ok(config)
}

fn parse_config(path: &Path, contents: &str) -> Result<Config> {
    let config: Config = match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(contents).context("Failed to parse YAML config")?
        }
        _ => serde_json::from_str(contents).context("Failed to parse JSON config")?,
    };
    Ok(config)
}

/// Apply environment overrides on top of a loaded (or default) config.
///
/// A missing or empty `LEMLIST_API_KEY` is not an error here: requests are
/// answered with a 500 until the key is provided.
pub fn apply_env(mut config: Config) -> Result<Config> {
    config.api_key = std::env::var(API_KEY_ENV)
        .ok()
        .filter(|key| !key.is_empty())
        .map(ApiKey::new);

    if let Ok(addr) = std::env::var(LISTEN_ADDR_ENV) {
        config.server.listen_addr = addr
            .parse()
            .with_context(|| format!("Invalid {} value: {}", LISTEN_ADDR_ENV, addr))?;
    }

    config.validate()?;
    Ok(config)
}
