mod common;

use std::cell::RefCell;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use oas_resolve::config::{ResolveOptions, RunConfig};
use oas_resolve::errors::{ResolveError, Result, Stage};
use oas_resolve::pipeline::Pipeline;
use oas_resolve::resolution::{Resolution, ResolutionEngine};
use oas_resolve::transport::Transport;
use oas_resolve::types::{DocumentTree, SourceIdentifier, SourceKind};
use proptest::prelude::*;
use tempfile::TempDir;

/// Engine that records the transport it was handed, then either echoes the
/// tree back or fails.
struct ProbeEngine {
    fail: bool,
    counter: RefCell<Option<Arc<AtomicUsize>>>,
    agent_live_during_call: RefCell<bool>,
}

impl ProbeEngine {
    fn new(fail: bool) -> Self {
        Self {
            fail,
            counter: RefCell::new(None),
            agent_live_during_call: RefCell::new(false),
        }
    }

    fn releases(&self) -> usize {
        self.counter
            .borrow()
            .as_ref()
            .map(|c| c.load(Ordering::SeqCst))
            .expect("engine was not called with a network transport")
    }
}

impl ResolutionEngine for ProbeEngine {
    fn resolve(
        &self,
        tree: DocumentTree,
        _source: &SourceIdentifier,
        _options: &ResolveOptions,
        transport: &Transport,
    ) -> Result<Resolution> {
        *self.counter.borrow_mut() = transport.release_count();
        *self.agent_live_during_call.borrow_mut() = transport.agent().is_some();
        if self.fail {
            return Err(ResolveError::Resolution {
                message: "engine refused".to_string(),
                reference: "#/x".to_string(),
            });
        }
        Ok(Resolution {
            document: tree,
            warnings: Vec::new(),
            resolved_refs: 0,
            dropped_refs: 0,
        })
    }
}

#[test]
fn test_network_resource_released_once_on_engine_failure() {
    let base = common::spawn_server(&[("/api.yaml", 200, "openapi: 3.0.0\n")]);
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("resolved.yaml");

    let engine = ProbeEngine::new(true);
    let config = RunConfig::new(format!("{base}/api.yaml"), &output, ResolveOptions::default());
    let err = Pipeline::with_engine(config, &engine).run().unwrap_err();

    assert_eq!(err.stage(), Stage::Resolution);
    assert!(*engine.agent_live_during_call.borrow());
    assert_eq!(engine.releases(), 1);
    assert!(!output.exists());
}

#[test]
fn test_network_resource_released_once_on_success() {
    let base = common::spawn_server(&[("/api.yaml", 200, "openapi: 3.0.0\n")]);
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("resolved.yaml");

    let engine = ProbeEngine::new(false);
    let config = RunConfig::new(format!("{base}/api.yaml"), &output, ResolveOptions::default());
    Pipeline::with_engine(config, &engine).run().unwrap();

    assert!(*engine.agent_live_during_call.borrow());
    assert_eq!(engine.releases(), 1);
}

#[test]
fn test_filesystem_source_gets_no_resource() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("spec.yaml");
    fs::write(&input, "openapi: 3.0.0\n").unwrap();
    let output = dir.path().join("resolved.yaml");

    let engine = ProbeEngine::new(false);
    let config = RunConfig::new(
        input.to_string_lossy().to_string(),
        &output,
        ResolveOptions::default(),
    );
    Pipeline::with_engine(config, &engine).run().unwrap();

    assert!(engine.counter.borrow().is_none());
    assert!(!*engine.agent_live_during_call.borrow());
}

#[test]
fn test_resource_released_when_acquisition_fails() {
    let source = SourceIdentifier::new("http://127.0.0.1:9/unreachable.yaml");
    let transport = Transport::select(&source);
    let counter = transport.release_count().unwrap();

    let result = oas_resolve::acquire::acquire(&source, &transport);
    assert!(matches!(result, Err(ResolveError::Acquisition { .. })));

    drop(transport);
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

proptest! {
    #[test]
    fn prop_http_prefixed_sources_are_network(rest in "[a-z0-9./-]{0,30}", secure in any::<bool>()) {
        let scheme = if secure { "https://" } else { "http://" };
        let source = SourceIdentifier::new(format!("{scheme}{rest}"));
        let transport = Transport::select(&source);
        prop_assert_eq!(transport.kind(), SourceKind::Network);
        prop_assert!(transport.agent().is_some());
    }

    #[test]
    fn prop_other_sources_are_filesystem(path in "[a-zA-Z0-9_./-]{0,40}") {
        prop_assume!(!path.to_ascii_lowercase().starts_with("http://"));
        prop_assume!(!path.to_ascii_lowercase().starts_with("https://"));
        let source = SourceIdentifier::new(path);
        let transport = Transport::select(&source);
        prop_assert_eq!(transport.kind(), SourceKind::Filesystem);
        prop_assert!(transport.release_count().is_none());
    }
}
