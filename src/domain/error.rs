use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Judgment error: {0}")]
    Judgment(String),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<String> for DomainError {
    fn from(s: String) -> Self {
        DomainError::DataUnavailable(s)
    }
}

impl From<&str> for DomainError {
    fn from(s: &str) -> Self {
        DomainError::DataUnavailable(s.to_string())
    }
}
