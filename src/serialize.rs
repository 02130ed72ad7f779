use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{ResolveError, Result};
use crate::types::{DocumentTree, OutputFormat};

/// Renders a document as pretty JSON (2-space indent) or YAML.
pub fn render(document: &DocumentTree, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(document).map_err(|e| {
                ResolveError::Serialization {
                    message: format!("failed to encode JSON: {e}"),
                    path: String::new(),
                }
            })?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(document).map_err(|e| ResolveError::Serialization {
                message: format!("failed to encode YAML: {e}"),
                path: String::new(),
            })
        }
    }
}

/// Renders the document and writes it to `output`, replacing any existing
/// file.
///
/// Writes to a temporary sibling first and renames it into place, so a failed
/// run never leaves a partial file behind.
pub fn write_output(document: &DocumentTree, format: OutputFormat, output: &Path) -> Result<()> {
    let rendered = render(document, format).map_err(|e| match e {
        ResolveError::Serialization { message, .. } => ResolveError::Serialization {
            message,
            path: output.display().to_string(),
        },
        other => other,
    })?;

    let tmp_path = tmp_path_for(output);

    fs::write(&tmp_path, &rendered).map_err(|e| ResolveError::Serialization {
        message: format!(
            "failed to write temporary file '{}': {}",
            tmp_path.display(),
            e
        ),
        path: output.display().to_string(),
    })?;

    fs::rename(&tmp_path, output).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        ResolveError::Serialization {
            message: format!(
                "failed to rename temporary file '{}' into place: {}",
                tmp_path.display(),
                e
            ),
            path: output.display().to_string(),
        }
    })?;

    Ok(())
}

/// `resolved.yaml` becomes `resolved.yaml.tmp` in the same directory.
fn tmp_path_for(output: &Path) -> PathBuf {
    let mut name = output
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("output"));
    name.push(".tmp");
    output.with_file_name(name)
}
