use thiserror::Error;

/// Errors from the anomaly scoring engine.
///
/// Every variant is a caller bug (bad configuration or a malformed input
/// series). Degenerate but well-formed data never produces an error.
#[derive(Debug, Error)]
pub enum AnomalyError {
    #[error("invalid configuration: {parameter} = {value} ({reason})")]
    InvalidConfiguration {
        parameter: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("timestamps must be strictly increasing: index {index} has {current} after {previous}")]
    UnorderedTimestamps {
        index: usize,
        previous: i64,
        current: i64,
    },

    #[error("non-finite error value at index {index}: {value}")]
    NonFiniteValue { index: usize, value: f64 },

    #[error("series length mismatch: {timestamps} timestamps vs {values} values")]
    LengthMismatch { timestamps: usize, values: usize },

    #[error("configuration parse error: {0}")]
    ConfigParse(String),

    #[error("configuration read error: {0}")]
    ConfigRead(String),
}

impl AnomalyError {
    pub(crate) fn invalid(
        parameter: &'static str,
        value: impl std::fmt::Display,
        reason: &'static str,
    ) -> Self {
        AnomalyError::InvalidConfiguration {
            parameter,
            value: value.to_string(),
            reason,
        }
    }
}

impl From<std::io::Error> for AnomalyError {
    fn from(e: std::io::Error) -> Self {
        AnomalyError::ConfigRead(e.to_string())
    }
}

impl From<toml::de::Error> for AnomalyError {
    fn from(e: toml::de::Error) -> Self {
        AnomalyError::ConfigParse(e.to_string())
    }
}

impl From<serde_json::Error> for AnomalyError {
    fn from(e: serde_json::Error) -> Self {
        AnomalyError::ConfigParse(e.to_string())
    }
}

/// Convenience type alias for engine results.
pub type AnomalyResult<T> = Result<T, AnomalyError>;
