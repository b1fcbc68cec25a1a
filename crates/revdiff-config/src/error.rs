//! Error types for the config crate.

/// Errors raised while reading or interpreting comparison settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A transform name that the pipeline does not know.
    #[error("unknown text transform: {0:?}")]
    UnknownTransform(String),

    /// A settings value that cannot be interpreted for its option.
    #[error("malformed setting '{option}' under '{key}': {reason}")]
    MalformedSetting {
        key: String,
        option: String,
        reason: String,
    },

    /// The configuration document failed to parse.
    #[error("parse error: {0}")]
    Parse(String),

    /// Reading the configuration file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for config results.
pub type ConfigResult<T> = Result<T, ConfigError>;
