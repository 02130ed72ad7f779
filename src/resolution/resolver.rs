use std::collections::HashMap;

use tracing::{debug, trace};

use crate::acquire::fetch_location;
use crate::config::ResolveOptions;
use crate::errors::{ResolveError, Result};
use crate::parse::parse_document;
use crate::transport::Transport;
use crate::types::{DocumentLocation, DocumentTree, SourceIdentifier};

use super::pointer::{parse_fragment, select, split_reference};
use super::{Resolution, ResolutionEngine};

/// Key of the member that marks a mapping as a reference.
const REF_KEY: &str = "$ref";

/// Default resolution engine.
///
/// Replaces `$ref` mappings with the content they point to:
/// - references matching the drop pattern are never touched;
/// - same-document references in the root document are resolved only when
///   `resolve_internal` is set;
/// - external documents are fetched once per run and cached by location;
///   references inside them are always resolved, since they would dangle
///   once copied into the root document;
/// - a reference already being expanded further up the path is a cycle and
///   is left in place with a warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefResolver;

impl RefResolver {
    pub fn new() -> Self {
        Self
    }
}

impl ResolutionEngine for RefResolver {
    fn resolve(
        &self,
        tree: DocumentTree,
        source: &SourceIdentifier,
        options: &ResolveOptions,
        transport: &Transport,
    ) -> Result<Resolution> {
        let root = source.location()?;
        let mut run = ResolveRun {
            options,
            transport,
            root: root.clone(),
            documents: HashMap::new(),
            stack: Vec::new(),
            warnings: Vec::new(),
            resolved_refs: 0,
            dropped_refs: 0,
        };
        run.documents.insert(root.clone(), tree.clone());

        let mut document = tree;
        run.walk(&mut document, &root)?;

        Ok(Resolution {
            document,
            warnings: run.warnings,
            resolved_refs: run.resolved_refs,
            dropped_refs: run.dropped_refs,
        })
    }
}

/// State for one `resolve` call.
struct ResolveRun<'a> {
    options: &'a ResolveOptions,
    transport: &'a Transport,
    root: DocumentLocation,
    /// Unresolved source trees, keyed by location. Includes the root.
    documents: HashMap<DocumentLocation, DocumentTree>,
    /// References currently being expanded, as (document, pointer) pairs.
    stack: Vec<(DocumentLocation, String)>,
    warnings: Vec<String>,
    resolved_refs: usize,
    dropped_refs: usize,
}

impl ResolveRun<'_> {
    /// Resolves every reference below `node`, which lives in document `doc`.
    fn walk(&mut self, node: &mut DocumentTree, doc: &DocumentLocation) -> Result<()> {
        if let Some(reference) = ref_target(node) {
            if let Some(replacement) = self.expand(&reference, doc)? {
                *node = replacement;
            }
            return Ok(());
        }

        match node {
            DocumentTree::Mapping(map) => {
                for (_, value) in map.iter_mut() {
                    self.walk(value, doc)?;
                }
            }
            DocumentTree::Sequence(seq) => {
                for item in seq.iter_mut() {
                    self.walk(item, doc)?;
                }
            }
            DocumentTree::Tagged(tagged) => self.walk(&mut tagged.value, doc)?,
            _ => {}
        }
        Ok(())
    }

    /// Returns the fully resolved target of `reference`, or `None` if the
    /// reference stays in place.
    fn expand(&mut self, reference: &str, doc: &DocumentLocation) -> Result<Option<DocumentTree>> {
        if self.options.is_dropped(reference) {
            debug!("leaving dropped reference {}", reference);
            self.dropped_refs += 1;
            return Ok(None);
        }

        let (doc_part, fragment) = split_reference(reference);
        if doc_part.is_empty() && *doc == self.root && !self.options.resolve_internal {
            trace!("leaving internal reference {}", reference);
            return Ok(None);
        }

        let target_doc = if doc_part.is_empty() {
            doc.clone()
        } else {
            match doc.join(doc_part) {
                Ok(location) => location,
                Err(e) => return self.fail(e).map(|_| None),
            }
        };

        let key = (target_doc.clone(), fragment.to_string());
        if self.stack.contains(&key) {
            self.warnings
                .push(format!("circular reference {reference} in {doc} left unresolved"));
            return Ok(None);
        }

        let mut target = match self.lookup(reference, &target_doc, fragment) {
            Ok(value) => value,
            Err(e) => return self.fail(e).map(|_| None),
        };

        self.stack.push(key);
        let walked = self.walk(&mut target, &target_doc);
        self.stack.pop();
        walked?;

        debug!("resolved {} from {}", reference, doc);
        self.resolved_refs += 1;
        Ok(Some(target))
    }

    /// Clones the unresolved value at `fragment` inside `location`, loading
    /// the document first if needed.
    fn lookup(
        &mut self,
        reference: &str,
        location: &DocumentLocation,
        fragment: &str,
    ) -> Result<DocumentTree> {
        if !self.documents.contains_key(location) {
            let loaded = self.load(reference, location)?;
            self.documents.insert(location.clone(), loaded);
        }

        let tokens = parse_fragment(fragment).ok_or_else(|| ResolveError::Resolution {
            message: format!("unsupported fragment '#{fragment}'"),
            reference: reference.to_string(),
        })?;

        self.documents
            .get(location)
            .and_then(|document| select(document, &tokens))
            .cloned()
            .ok_or_else(|| ResolveError::Resolution {
                message: format!("no value at '#{fragment}' in {location}"),
                reference: reference.to_string(),
            })
    }

    fn load(&self, reference: &str, location: &DocumentLocation) -> Result<DocumentTree> {
        let text = fetch_location(location, self.transport).map_err(|e| ResolveError::Resolution {
            message: format!("cannot fetch external document: {e}"),
            reference: reference.to_string(),
        })?;
        parse_document(&text, &location.to_string(), self.options.yaml_merge).map_err(|e| {
            ResolveError::Resolution {
                message: format!("cannot parse external document: {e}"),
                reference: reference.to_string(),
            }
        })
    }

    /// Aborts in fatal mode; otherwise records the error as a warning.
    fn fail(&mut self, err: ResolveError) -> Result<()> {
        if self.options.fatal {
            return Err(err);
        }
        self.warnings.push(err.to_string());
        Ok(())
    }
}

/// Returns the reference string if `node` is a `$ref` mapping.
fn ref_target(node: &DocumentTree) -> Option<String> {
    match node {
        DocumentTree::Mapping(map) => map.get(REF_KEY)?.as_str().map(str::to_string),
        _ => None,
    }
}
