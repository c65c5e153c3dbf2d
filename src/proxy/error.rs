// src/proxy/error.rs
use hyper::StatusCode;
use serde_json::json;

/// Failures the proxy answers itself. Upstream error statuses are not
/// represented here: they are relayed as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProxyError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("LEMLIST_API_KEY missing")]
    MissingApiKey,

    #[error("{}", transport_message(.0))]
    Transport(String),
}

fn transport_message(msg: &str) -> &str {
    if msg.is_empty() {
        "Bad gateway"
    } else {
        msg
    }
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::MissingApiKey => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::Transport(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// `{"error": "<message>"}`
    pub fn body(&self) -> String {
        json!({ "error": self.to_string() }).to_string()
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(err: reqwest::Error) -> Self {
        ProxyError::Transport(err.to_string())
    }
}
