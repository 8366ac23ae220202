//! Error types for bot operations

use thiserror::Error;

/// Bot specific errors
#[derive(Debug, Error)]
pub enum BotError {
    /// Upstream data source failed or returned an unusable shape
    #[error("Data not available for {symbol}: {reason}")]
    UpstreamData { symbol: String, reason: String },

    /// Invalid ticker symbol provided
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Rendering pipeline failure
    #[error("Render error: {0}")]
    Render(#[from] quotebot_render::RenderError),

    /// Discord delivery failure
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rate limit exceeded for API
    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded { provider: String },

    /// Per-user command cooldown still active
    #[error("Command on cooldown, retry in {retry_after}s")]
    Cooldown { retry_after: u64 },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl BotError {
    /// Best-effort human-readable reason for the user-facing error embed
    pub fn user_reason(&self) -> String {
        match self {
            Self::UpstreamData { reason, .. } if !reason.is_empty() => reason.clone(),
            Self::InvalidSymbol(symbol) => format!("Unknown ticker {symbol}"),
            Self::Cooldown { retry_after } => {
                format!("Slow down, try again in {retry_after} seconds")
            },
            Self::Render(_) | Self::Delivery(_) | Self::Network(_) | Self::Json(_) => {
                "No data found".to_string()
            },
            other => {
                let text = other.to_string();
                if text.is_empty() {
                    "No data found".to_string()
                } else {
                    text
                }
            },
        }
    }
}

/// Result type alias for bot operations
pub type Result<T> = std::result::Result<T, BotError>;
