use thiserror::Error;

pub type Result<T> = std::result::Result<T, ArchError>;

#[derive(Debug, Error)]
pub enum ArchError {
    /// The entity description can't be compiled into a schema.
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    /// An expression, function call or query was assembled from incompatible parts.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Engine not supported: {0}")]
    UnsupportedEngine(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ArchError {
    pub fn is_model_error(&self) -> bool {
        matches!(self, ArchError::InvalidModel(_))
    }

    pub fn is_query_error(&self) -> bool {
        matches!(self, ArchError::InvalidQuery(_))
    }
}

/// Fails with [`ArchError::InvalidQuery`] unless `cond` holds.
pub(crate) fn assure_query(cond: bool, message: impl FnOnce() -> String) -> Result<()> {
    if cond {
        Ok(())
    } else {
        Err(ArchError::InvalidQuery(message()))
    }
}

/// Fails with [`ArchError::InvalidModel`] unless `cond` holds.
pub(crate) fn assure_model(cond: bool, message: impl FnOnce() -> String) -> Result<()> {
    if cond {
        Ok(())
    } else {
        Err(ArchError::InvalidModel(message()))
    }
}
