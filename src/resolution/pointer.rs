use crate::types::DocumentTree;

/// Splits a reference into its document part and its fragment.
///
/// `"pet.yaml#/Pet"` becomes `("pet.yaml", "/Pet")`; an internal reference
/// such as `"#/components/schemas/Pet"` has an empty document part.
pub fn split_reference(reference: &str) -> (&str, &str) {
    match reference.split_once('#') {
        Some((doc, fragment)) => (doc, fragment),
        None => (reference, ""),
    }
}

/// Parses a JSON-pointer fragment (RFC 6901) into unescaped tokens.
///
/// Returns `None` for fragments that are not pointers (plain-name anchors).
pub fn parse_fragment(fragment: &str) -> Option<Vec<String>> {
    let decoded = percent_decode(fragment)?;
    if decoded.is_empty() {
        return Some(Vec::new());
    }
    let rest = decoded.strip_prefix('/')?;
    Some(
        rest.split('/')
            .map(|token| token.replace("~1", "/").replace("~0", "~"))
            .collect(),
    )
}

/// Walks `tokens` down from `root`. Sequence tokens must be decimal indices.
pub fn select<'a>(root: &'a DocumentTree, tokens: &[String]) -> Option<&'a DocumentTree> {
    let mut current = root;
    for token in tokens {
        current = match current {
            DocumentTree::Mapping(map) => map.get(token.as_str())?,
            DocumentTree::Sequence(seq) => seq.get(token.parse::<usize>().ok()?)?,
            DocumentTree::Tagged(tagged) => select(&tagged.value, std::slice::from_ref(token))?,
            _ => return None,
        };
    }
    Some(current)
}

fn percent_decode(input: &str) -> Option<String> {
    if !input.contains('%') {
        return Some(input.to_string());
    }
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = input.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}
