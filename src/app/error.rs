use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiaryError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Source not found: {0}")]
    SourceNotFound(String),

    #[error("Could not open link: {0}")]
    LinkOpen(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl DiaryError {
    /// Fetch or decode failures, recovered locally with a manual retry.
    pub fn is_network(&self) -> bool {
        matches!(self, DiaryError::Http(_) | DiaryError::Json(_))
    }
}

pub type Result<T> = std::result::Result<T, DiaryError>;
