use thiserror::Error;

#[derive(Error, Debug)]
pub enum GlobalsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid color '{value}' for type '{type_name}'")]
    InvalidColor { type_name: String, value: String },
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, GlobalsError>;
