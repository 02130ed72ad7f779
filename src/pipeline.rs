use std::path::PathBuf;
use std::time::Instant;

use tracing::{info, warn};

use crate::acquire::acquire;
use crate::config::RunConfig;
use crate::errors::Result;
use crate::parse::parse_document;
use crate::resolution::{RefResolver, ResolutionEngine};
use crate::serialize::write_output;
use crate::transport::Transport;
use crate::types::{OutputFormat, SourceIdentifier, SourceKind};

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Transport the source was fetched with.
    pub source_kind: SourceKind,
    /// File the resolved document was written to.
    pub output: PathBuf,
    pub format: OutputFormat,
    pub resolved_refs: usize,
    pub dropped_refs: usize,
    pub warnings: Vec<String>,
    /// Time taken in milliseconds.
    pub duration_ms: u64,
}

/// Drives one run: acquire, parse, resolve, reclaim, serialize.
///
/// Every stage failure ends the run before anything is written.
pub struct Pipeline<E: ResolutionEngine = RefResolver> {
    config: RunConfig,
    engine: E,
}

impl Pipeline<RefResolver> {
    /// Creates a pipeline that uses the bundled resolver.
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            engine: RefResolver::new(),
        }
    }
}

impl<E: ResolutionEngine> Pipeline<E> {
    /// Creates a pipeline around a custom engine.
    pub fn with_engine(config: RunConfig, engine: E) -> Self {
        Self { config, engine }
    }

    pub fn run(&self) -> Result<RunSummary> {
        let start = Instant::now();
        let options = &self.config.options;
        let source = SourceIdentifier::new(self.config.filespec.as_str());

        // The transport is dropped (and thereby released) on every early
        // return below.
        let mut transport = Transport::select(&source);

        let acquired = acquire(&source, &transport)?;
        let tree = parse_document(&acquired.text, source.as_str(), options.yaml_merge)?;

        let outcome = self.engine.resolve(tree, &source, options, &transport);
        transport.release();
        let resolution = outcome?;

        for warning in &resolution.warnings {
            warn!("{}", warning);
        }

        let format = options.output_format();
        write_output(&resolution.document, format, &self.config.output)?;

        let summary = RunSummary {
            source_kind: source.kind(),
            output: self.config.output.clone(),
            format,
            resolved_refs: resolution.resolved_refs,
            dropped_refs: resolution.dropped_refs,
            warnings: resolution.warnings,
            duration_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            "wrote {} ({}): {} resolved, {} dropped in {}ms",
            summary.output.display(),
            summary.format.as_str(),
            summary.resolved_refs,
            summary.dropped_refs,
            summary.duration_ms
        );
        Ok(summary)
    }
}
