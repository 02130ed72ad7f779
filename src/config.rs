use std::path::PathBuf;

use regex::Regex;

use crate::errors::{ResolveError, Result};
use crate::types::OutputFormat;

/// Output path used when `--output` is not given.
pub const DEFAULT_OUTPUT: &str = "resolved.yaml";

/// Verbosity before any `--verbose` or `--quiet` flags are applied.
pub const DEFAULT_VERBOSITY: i32 = 2;

/// Command-line level policy, as parsed from the flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliFlags {
    /// Number of `--verbose` occurrences.
    pub verbose: u8,
    /// Number of `--quiet` occurrences.
    pub quiet: u8,
    /// Pattern for references to leave unresolved.
    pub drop_refs: Option<String>,
    pub resolve_internal: bool,
    pub json_output: bool,
    pub yaml_merge: bool,
}

/// Immutable policy handed to the parser and the resolution engine.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// May be negative; anything at or below zero means minimal output.
    pub verbosity: i32,
    /// Abort on the first resolution error instead of recording a warning.
    pub fatal: bool,
    /// References whose string matches are left unresolved.
    pub drop_refs: Option<Regex>,
    /// Also resolve same-document references.
    pub resolve_internal: bool,
    pub json_output: bool,
    /// Expand `<<` merge keys while parsing.
    pub yaml_merge: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            verbosity: DEFAULT_VERBOSITY,
            fatal: true,
            drop_refs: None,
            resolve_internal: false,
            json_output: false,
            yaml_merge: false,
        }
    }
}

impl ResolveOptions {
    pub fn output_format(&self) -> OutputFormat {
        if self.json_output {
            OutputFormat::Json
        } else {
            OutputFormat::Yaml
        }
    }

    /// Returns `true` if the reference should be left untouched.
    pub fn is_dropped(&self, reference: &str) -> bool {
        self.drop_refs
            .as_ref()
            .is_some_and(|re| re.is_match(reference))
    }
}

/// Everything a single pipeline run needs.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Path or URL of the input document.
    pub filespec: String,
    /// Where the resolved document is written.
    pub output: PathBuf,
    pub options: ResolveOptions,
}

impl RunConfig {
    pub fn new(filespec: impl Into<String>, output: impl Into<PathBuf>, options: ResolveOptions) -> Self {
        Self {
            filespec: filespec.into(),
            output: output.into(),
            options,
        }
    }
}

/// Computes `DEFAULT_VERBOSITY + verbose - quiet` without clamping.
pub fn compute_verbosity(verbose: u8, quiet: u8) -> i32 {
    DEFAULT_VERBOSITY + i32::from(verbose) - i32::from(quiet)
}

/// Translates command-line flags into resolution options.
///
/// Deterministic and side-effect free. `fatal` is always set. The only
/// failure is an invalid drop-reference pattern.
pub fn build_options(flags: &CliFlags) -> Result<ResolveOptions> {
    let drop_refs = match flags.drop_refs.as_deref() {
        Some(pattern) => Some(Regex::new(pattern).map_err(|e| ResolveError::Config {
            message: format!("invalid --droprefs pattern '{pattern}': {e}"),
        })?),
        None => None,
    };

    Ok(ResolveOptions {
        verbosity: compute_verbosity(flags.verbose, flags.quiet),
        fatal: true,
        drop_refs,
        resolve_internal: flags.resolve_internal,
        json_output: flags.json_output,
        yaml_merge: flags.yaml_merge,
    })
}

/// Maps a verbosity level to a tracing filter directive.
pub fn log_level_for(verbosity: i32) -> &'static str {
    match verbosity {
        i32::MIN..=0 => "error",
        1 => "warn",
        2 => "info",
        3 => "debug",
        _ => "trace",
    }
}
