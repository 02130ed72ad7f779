use std::fmt;

use thiserror::Error;

/// Pipeline stage at which a run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Acquisition,
    Parse,
    Config,
    Resolution,
    Serialization,
}

impl Stage {
    /// Returns the string representation of this stage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Acquisition => "acquisition",
            Stage::Parse => "parse",
            Stage::Config => "config",
            Stage::Resolution => "resolution",
            Stage::Serialization => "serialization",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while resolving a document.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("acquisition error: {message} (source: {source_id})")]
    Acquisition { message: String, source_id: String },

    #[error("parse error: {message} (source: {source_id}, line: {line:?})")]
    Parse {
        message: String,
        source_id: String,
        line: Option<usize>,
    },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("resolution error: {message} (reference: {reference})")]
    Resolution { message: String, reference: String },

    #[error("serialization error: {message} (path: {path})")]
    Serialization { message: String, path: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ResolveError {
    /// Returns the stage this error belongs to.
    ///
    /// Bare conversions (`Io`, `Json`, `Yaml`) only arise while writing output,
    /// so they are attributed to serialization.
    pub fn stage(&self) -> Stage {
        match self {
            ResolveError::Acquisition { .. } => Stage::Acquisition,
            ResolveError::Parse { .. } => Stage::Parse,
            ResolveError::Config { .. } => Stage::Config,
            ResolveError::Resolution { .. } => Stage::Resolution,
            ResolveError::Serialization { .. }
            | ResolveError::Io(_)
            | ResolveError::Json(_)
            | ResolveError::Yaml(_) => Stage::Serialization,
        }
    }
}

/// Convenience alias for results using `ResolveError`.
pub type Result<T> = std::result::Result<T, ResolveError>;
