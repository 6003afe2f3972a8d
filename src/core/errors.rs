use thiserror::Error;

use crate::gemini::GenerateError;

#[derive(Error, Debug)]
pub enum AnkiMdError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Reqwest error: {0}")]
    Reqwest(Box<reqwest::Error>),

    #[error("AnkiConnect error: {0}")]
    AnkiConnect(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Generation error: {0}")]
    Generate(#[from] GenerateError),

    #[error("AnkiMdError: {0}")]
    Custom(String),
}

impl From<std::io::Error> for AnkiMdError {
    fn from(error: std::io::Error) -> Self {
        AnkiMdError::Io(Box::new(error))
    }
}

impl From<reqwest::Error> for AnkiMdError {
    fn from(error: reqwest::Error) -> Self {
        AnkiMdError::Reqwest(Box::new(error))
    }
}
