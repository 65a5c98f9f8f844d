//! Error handling for the pdf-insight application

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfInsightError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction error: {0}")]
    Extraction(String),

    #[error("Embedding generation error: {0}")]
    Embedding(String),

    #[error("Model loading error: {0}")]
    ModelLoading(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Processing error: {0}")]
    Processing(String),
}

pub type Result<T> = std::result::Result<T, PdfInsightError>;

/// Convert anyhow errors to our custom error type
impl From<anyhow::Error> for PdfInsightError {
    fn from(err: anyhow::Error) -> Self {
        PdfInsightError::Processing(err.to_string())
    }
}
