//! Domain error types.
//!
//! The numerical core degrades gracefully on short or empty inputs, so the
//! variants here cover boundary failures only: configuration, price data
//! access and precondition violations such as a malformed weight vector.

/// Top-level error type for quantdash.
#[derive(Debug, thiserror::Error)]
pub enum QuantError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("price data error: {reason}")]
    Data { reason: String },

    #[error("no price data for {code}")]
    NoData { code: String },

    #[error("invalid weights: {reason}")]
    InvalidWeights { reason: String },

    #[error("unknown strategy '{name}'")]
    UnknownStrategy { name: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&QuantError> for std::process::ExitCode {
    fn from(err: &QuantError) -> Self {
        let code: u8 = match err {
            QuantError::Io(_) => 1,
            QuantError::ConfigParse { .. }
            | QuantError::ConfigMissing { .. }
            | QuantError::ConfigInvalid { .. } => 2,
            QuantError::Data { .. } | QuantError::NoData { .. } => 3,
            QuantError::InvalidWeights { .. } => 4,
            QuantError::UnknownStrategy { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
