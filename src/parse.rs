use crate::errors::{ResolveError, Result};
use crate::types::DocumentTree;

/// Parses raw YAML (or JSON) text into a document tree.
///
/// `<<` merge keys are expanded only when `yaml_merge` is set; otherwise they
/// are kept as ordinary keys. Malformed input yields no tree at all.
pub fn parse_document(text: &str, source_id: &str, yaml_merge: bool) -> Result<DocumentTree> {
    let mut tree: DocumentTree = serde_yaml::from_str(text).map_err(|e| parse_error(e, source_id))?;

    if yaml_merge {
        tree.apply_merge().map_err(|e| parse_error(e, source_id))?;
    }

    Ok(tree)
}

fn parse_error(err: serde_yaml::Error, source_id: &str) -> ResolveError {
    ResolveError::Parse {
        line: err.location().map(|loc| loc.line()),
        message: err.to_string(),
        source_id: source_id.to_string(),
    }
}
