use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::process;

use tracing_subscriber::EnvFilter;

use oas_resolve::config::{build_options, log_level_for, CliFlags, RunConfig, DEFAULT_OUTPUT};
use oas_resolve::errors::ResolveError;
use oas_resolve::pipeline::Pipeline;

/// Resolve $ref references in a YAML or JSON document.
#[derive(Parser)]
#[command(name = "oas-resolve", about = "Resolve $ref references in a YAML or JSON document")]
struct Cli {
    /// Path or URL of the document to resolve
    filespec: String,
    /// File to output to
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,
    /// Reduce verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    quiet: u8,
    /// Increase verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Regexp for $refs to be left unresolved
    #[arg(long = "droprefs", value_name = "PATTERN")]
    droprefs: Option<String>,
    /// Resolve all internal references
    #[arg(long = "resolveInternal")]
    resolve_internal: bool,
    /// Write result as JSON rather than YAML
    #[arg(long = "jsonOutput")]
    json_output: bool,
    /// Resolve YAML merge keys (<<)
    #[arg(long = "yamlMerge")]
    yaml_merge: bool,
}

impl Cli {
    fn flags(&self) -> CliFlags {
        CliFlags {
            verbose: self.verbose,
            quiet: self.quiet,
            drop_refs: self.droprefs.clone(),
            resolve_internal: self.resolve_internal,
            json_output: self.json_output,
            yaml_merge: self.yaml_merge,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), ResolveError> {
    let options = build_options(&cli.flags())?;
    init_logging(options.verbosity);

    let config = RunConfig::new(cli.filespec, cli.output, options);
    Pipeline::new(config).run()?;
    Ok(())
}

/// Sends diagnostics to stderr. `RUST_LOG` takes precedence over the
/// verbosity flags.
fn init_logging(verbosity: i32) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level_for(verbosity)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
