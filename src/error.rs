use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Request error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Authentication failed: {0}")]
    Auth(String),
}

impl Error {
    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn auth_error(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
