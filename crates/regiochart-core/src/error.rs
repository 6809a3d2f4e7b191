pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("chart request JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid chart request: {message}")]
    InvalidRequest { message: String },
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }
}
