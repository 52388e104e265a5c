use reqwest::StatusCode;
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CatError {
    #[error("Failed to encode message: {0}")]
    Encoding(#[source] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to decode response: {0}")]
    Decoding(#[source] serde_json::Error),

    #[error("Frame observer failed: {0}")]
    Observer(#[source] anyhow::Error),

    #[error("Request failed: {status}: {body}")]
    Http { status: StatusCode, body: String },

    #[error("HTTP transport error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl CatError {
    pub fn transport<S: Into<String>>(message: S) -> Self {
        CatError::Transport(message.into())
    }
}

pub type CatResult<T> = Result<T, CatError>;
