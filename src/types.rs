use std::fmt;
use std::path::{Path, PathBuf};

use url::Url;

use crate::errors::{ResolveError, Result};

/// In-memory document tree produced by the parser and consumed by the engine.
///
/// Mappings keep their insertion order, so re-serializing a tree is
/// deterministic.
pub type DocumentTree = serde_yaml::Value;

/// Transport class of a source identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Network,
    Filesystem,
}

impl SourceKind {
    /// Classifies a raw identifier. Total over all strings: anything that does
    /// not start with an HTTP(S) scheme is treated as a filesystem path.
    pub fn classify(raw: &str) -> SourceKind {
        let lower = raw.get(..8).unwrap_or(raw).to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            SourceKind::Network
        } else {
            SourceKind::Filesystem
        }
    }

    /// Returns the string representation of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Network => "network",
            SourceKind::Filesystem => "filesystem",
        }
    }
}

/// The path or URL given on the command line.
///
/// Immutable once created. Doubles as the base for resolving relative
/// references found in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceIdentifier {
    raw: String,
    kind: SourceKind,
}

impl SourceIdentifier {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let kind = SourceKind::classify(&raw);
        Self { raw, kind }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn is_network(&self) -> bool {
        self.kind == SourceKind::Network
    }

    /// Converts the identifier into a concrete location.
    ///
    /// Fails for network identifiers that are not valid URLs.
    pub fn location(&self) -> Result<DocumentLocation> {
        match self.kind {
            SourceKind::Network => Url::parse(&self.raw)
                .map(DocumentLocation::Url)
                .map_err(|e| ResolveError::Acquisition {
                    message: format!("invalid URL: {e}"),
                    source_id: self.raw.clone(),
                }),
            SourceKind::Filesystem => Ok(DocumentLocation::Path(PathBuf::from(&self.raw))),
        }
    }
}

impl fmt::Display for SourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Where a document (the root one or an external one) lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocumentLocation {
    Url(Url),
    Path(PathBuf),
}

impl DocumentLocation {
    /// Resolves a reference's document part against this location.
    ///
    /// Absolute HTTP(S) targets always become URLs. Relative targets are joined
    /// against the URL, or against the directory containing the file.
    pub fn join(&self, target: &str) -> Result<DocumentLocation> {
        if SourceKind::classify(target) == SourceKind::Network {
            return Url::parse(target)
                .map(DocumentLocation::Url)
                .map_err(|e| ResolveError::Resolution {
                    message: format!("invalid URL: {e}"),
                    reference: target.to_string(),
                });
        }

        match self {
            DocumentLocation::Url(base) => {
                base.join(target)
                    .map(DocumentLocation::Url)
                    .map_err(|e| ResolveError::Resolution {
                        message: format!("cannot join against '{base}': {e}"),
                        reference: target.to_string(),
                    })
            }
            DocumentLocation::Path(base) => {
                let target_path = Path::new(target);
                if target_path.is_absolute() {
                    return Ok(DocumentLocation::Path(target_path.to_path_buf()));
                }
                let dir = base.parent().unwrap_or_else(|| Path::new(""));
                Ok(DocumentLocation::Path(dir.join(target_path)))
            }
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, DocumentLocation::Url(_))
    }
}

impl fmt::Display for DocumentLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentLocation::Url(url) => write!(f, "{url}"),
            DocumentLocation::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Encoding used when writing the resolved document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Yaml,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Yaml => "yaml",
            OutputFormat::Json => "json",
        }
    }
}
