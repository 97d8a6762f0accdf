use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a request to the history API. The `Display` text is what the
/// pages show in their error view.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response; the body is surfaced as the message.
    #[error("{}", status_message(.status, .body))]
    Status { status: StatusCode, body: String },

    #[error("invalid response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid API address: {0}")]
    Url(#[from] url::ParseError),
}

fn status_message(status: &StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        format!("HTTP {status}")
    } else {
        body.to_string()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum TileError {
    #[error("tile request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("tile server answered {0}")]
    Status(StatusCode),

    #[error("could not decode tile: {0}")]
    Decode(#[from] image::ImageError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not a valid URL: {source}")]
    InvalidUrl {
        var: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("{var} must be a positive number, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("could not start the async runtime: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("could not build the HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
