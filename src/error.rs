use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("xml error at {line}:{column}: {message}")]
    Xml {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("invalid ts document: {0}")]
    Format(String),

    #[error("{0}")]
    Project(String),

    #[error("not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
