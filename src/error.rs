use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Expected a list of pipeline results, got {0}")]
    NotAList(&'static str),
}

pub type Result<T> = std::result::Result<T, BoardError>;
