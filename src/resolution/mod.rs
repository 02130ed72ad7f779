//! Reference resolution.
//!
//! The pipeline only talks to an engine through [`ResolutionEngine`]; the
//! crate ships [`RefResolver`], which inlines `$ref` pointers across local and
//! remote documents.
mod pointer;
mod resolver;

pub use pointer::{parse_fragment, select, split_reference};
pub use resolver::RefResolver;

use crate::config::ResolveOptions;
use crate::errors::Result;
use crate::transport::Transport;
use crate::types::{DocumentTree, SourceIdentifier};

/// Outcome of a resolution call.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The resolved tree, replacing the one handed to the engine.
    pub document: DocumentTree,
    /// Problems the engine chose to report instead of failing on.
    pub warnings: Vec<String>,
    /// Number of references replaced by their targets.
    pub resolved_refs: usize,
    /// Number of references left untouched because of the drop pattern.
    pub dropped_refs: usize,
}

/// Contract between the pipeline and a reference-resolution engine.
///
/// The engine receives the parsed tree, the identifier used as the base for
/// relative references, the run's policy and a borrow of the transport it may
/// use for nested fetches. It must not keep the transport past the call.
pub trait ResolutionEngine {
    fn resolve(
        &self,
        tree: DocumentTree,
        source: &SourceIdentifier,
        options: &ResolveOptions,
        transport: &Transport,
    ) -> Result<Resolution>;
}

impl<T: ResolutionEngine + ?Sized> ResolutionEngine for &T {
    fn resolve(
        &self,
        tree: DocumentTree,
        source: &SourceIdentifier,
        options: &ResolveOptions,
        transport: &Transport,
    ) -> Result<Resolution> {
        (**self).resolve(tree, source, options, transport)
    }
}
