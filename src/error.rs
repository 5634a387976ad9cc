use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GlyphError>;

#[derive(Error, Debug)]
pub enum GlyphError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{command} timed out after {after:?}")]
    Timeout { command: String, after: Duration },
    #[error("External tool error: {0}")]
    ExternalTool(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GlyphError {
    /// HTTP status the error surfaces as.
    pub fn status_code(&self) -> u16 {
        match self {
            GlyphError::Validation(_) => 400,
            GlyphError::NotFound(_) => 404,
            GlyphError::Conflict(_) => 409,
            GlyphError::Timeout { .. } => 504,
            GlyphError::ExternalTool(_) | GlyphError::Storage(_) | GlyphError::Io(_) => 500,
        }
    }
}
