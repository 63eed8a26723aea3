use thiserror::Error;

#[derive(Debug, Error)]
pub enum HaggleError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Negotiation '{0}' not found")]
    NotFound(String),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, HaggleError>;
