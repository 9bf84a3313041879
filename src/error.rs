//! The single error type shared by containers, operators and IO.

use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {

    #[error("shape mismatch in {context}: expected {expected}, found {found}")]
    ShapeMismatch {
        context: &'static str,
        expected: String,
        found: String,
    },

    #[error("invalid geometry: {0}")]
    Geometry(String),

    #[error("failed to read `{path}`: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("could not parse config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("simulation failed: {0}")]
    Simulation(String),

    /// Failure reported by an externally supplied acquisition model
    #[error("acquisition model failed: {0}")]
    Operator(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn shape_mismatch(
        context: &'static str,
        expected: impl std::fmt::Debug,
        found: impl std::fmt::Debug,
    ) -> Self {
        Error::ShapeMismatch {
            context,
            expected: format!("{expected:?}"),
            found: format!("{found:?}"),
        }
    }
}
