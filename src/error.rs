//! Error taxonomy for extraction.
//!
//! Every error carries a process exit code so host binaries can map failures
//! directly (`2` = caller input/configuration, `4` = internal/runtime).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractError>;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// Empty samples, empty fitter lists, out-of-domain parameters.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A required piece of configuration was not supplied at all.
    ///
    /// Kept apart from `InvalidArgument` so "nothing was passed" can be told
    /// from "an explicitly empty configuration was passed".
    #[error("Missing configuration: {0}")]
    NullConfiguration(String),

    /// Environment or config values that could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Worker pool error: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl ExtractError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ExtractError::InvalidArgument(message.into())
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            ExtractError::InvalidArgument(_)
            | ExtractError::NullConfiguration(_)
            | ExtractError::Config(_) => 2,
            ExtractError::WorkerPool(_) => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_errors_map_to_usage_exit_code() {
        assert_eq!(ExtractError::invalid("x").exit_code(), 2);
        assert_eq!(ExtractError::NullConfiguration("fitters".into()).exit_code(), 2);
        assert_eq!(ExtractError::Config("bad".into()).exit_code(), 2);
    }

    #[test]
    fn display_includes_category() {
        let err = ExtractError::invalid("values cannot be empty");
        assert_eq!(err.to_string(), "Invalid argument: values cannot be empty");
    }
}
