use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned HTTP {status} for {url}")]
    UpstreamStatus { status: u16, url: String },

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected {carrier} response: {message}")]
    UnexpectedShape {
        carrier: &'static str,
        message: String,
    },

    #[error("No JSON.parse call found in the tracking page")]
    EmbeddedJsonMissing,

    #[error("Malformed embedded JSON literal: {0}")]
    EmbeddedJsonMalformed(String),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown carrier: {0}")]
    UnknownCarrier(String),
}

impl TrackerError {
    pub fn shape(carrier: &'static str, message: impl Into<String>) -> Self {
        TrackerError::UnexpectedShape {
            carrier,
            message: message.into(),
        }
    }

    /// Whether the failure originated upstream (transport, status or payload).
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            TrackerError::Http(_)
                | TrackerError::UpstreamStatus { .. }
                | TrackerError::Json(_)
                | TrackerError::UnexpectedShape { .. }
                | TrackerError::EmbeddedJsonMissing
                | TrackerError::EmbeddedJsonMalformed(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
