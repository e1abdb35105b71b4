pub type SyntherResult<T> = Result<T, SyntherError>;

#[derive(thiserror::Error, Debug)]
pub enum SyntherError {
    #[error("missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("range error: {0}")]
    Range(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SyntherError {
    pub fn missing_configuration(msg: impl Into<String>) -> Self {
        Self::MissingConfiguration(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn range(msg: impl Into<String>) -> Self {
        Self::Range(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
