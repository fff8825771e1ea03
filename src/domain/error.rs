//! Domain error types.
//!
//! Configuration and data errors are raised before any computation starts.
//! Degenerate statistics (zero variance, zero trades) are not errors; see
//! [`crate::domain::metrics`].

/// Top-level error type for finbytes.
#[derive(Debug, thiserror::Error)]
pub enum FinbytesError {
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

    #[error("empty price series")]
    EmptySeries,

    #[error("invalid bar at index {index}, field {field}: {reason}")]
    DataInvalid {
        index: usize,
        field: String,
        reason: String,
    },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("backtest cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FinbytesError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        FinbytesError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn bar(index: usize, field: &str, reason: impl Into<String>) -> Self {
        FinbytesError::DataInvalid {
            index,
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            FinbytesError::ConfigParse { .. }
                | FinbytesError::ConfigMissing { .. }
                | FinbytesError::ConfigInvalid { .. }
        )
    }

    pub fn is_data(&self) -> bool {
        matches!(
            self,
            FinbytesError::EmptySeries
                | FinbytesError::DataInvalid { .. }
                | FinbytesError::DataSource { .. }
        )
    }
}

impl From<&FinbytesError> for std::process::ExitCode {
    fn from(err: &FinbytesError) -> Self {
        let code: u8 = match err {
            FinbytesError::Io(_) => 1,
            FinbytesError::ConfigParse { .. }
            | FinbytesError::ConfigMissing { .. }
            | FinbytesError::ConfigInvalid { .. } => 2,
            FinbytesError::EmptySeries
            | FinbytesError::DataInvalid { .. }
            | FinbytesError::DataSource { .. } => 5,
            FinbytesError::Cancelled => 6,
        };
        std::process::ExitCode::from(code)
    }
}
