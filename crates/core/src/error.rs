/// Result alias that carries the custom [`ChartError`] type.
pub type Result<T> = std::result::Result<T, ChartError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    /// Charts support between one and six lanes.
    #[error("key count {0} is outside the supported range 1..=6")]
    InvalidKeyCount(usize),
    #[error("unknown difficulty level `{0}`")]
    UnknownDifficulty(String),
    /// A difficulty profile field fell outside its documented range.
    #[error("invalid difficulty profile: `{field}` {reason}")]
    InvalidProfile {
        field: &'static str,
        reason: &'static str,
    },
    /// Analysis data that breaks the feature extraction contract.
    #[error("invalid analysis input: {0}")]
    InvalidInput(String),
    #[error("lane sampling failed: {0}")]
    Sampling(#[from] rand::distributions::WeightedError),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Message(String),
}

impl ChartError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for ChartError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for ChartError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
