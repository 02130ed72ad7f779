//! Transport selection and the run-scoped network resource.
//!
//! A network source gets exactly one keep-alive [`ureq::Agent`] for the whole
//! run. The agent is released once, either explicitly by the pipeline after
//! the resolution call settles or by `Drop` on any early exit.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::types::{SourceIdentifier, SourceKind};

/// Builds the agent configuration shared by every fetch.
///
/// Status codes are returned as values so the acquirer can report them.
pub(crate) fn new_agent() -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build();
    ureq::Agent::new_with_config(config)
}

/// Keep-alive connection pool owned by a single run.
pub struct NetworkTransport {
    agent: Option<ureq::Agent>,
    releases: Arc<AtomicUsize>,
}

impl NetworkTransport {
    fn new() -> Self {
        debug!("allocating keep-alive connection pool");
        Self {
            agent: Some(new_agent()),
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Returns the agent, or `None` once the transport has been released.
    pub fn agent(&self) -> Option<&ureq::Agent> {
        self.agent.as_ref()
    }

    /// Drops the connection pool. Only the first call has an effect.
    pub fn release(&mut self) {
        if let Some(agent) = self.agent.take() {
            drop(agent);
            self.releases.fetch_add(1, Ordering::SeqCst);
            debug!("released keep-alive connection pool");
        }
    }

    pub fn is_released(&self) -> bool {
        self.agent.is_none()
    }

    /// Shared counter of how many times the pool was actually released.
    pub fn release_count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.releases)
    }
}

impl Drop for NetworkTransport {
    fn drop(&mut self) {
        self.release();
    }
}

/// Transport chosen for a source identifier.
pub enum Transport {
    Network(NetworkTransport),
    Filesystem,
}

impl Transport {
    /// Classifies the source and provisions a connection pool for network
    /// sources. Filesystem sources allocate nothing.
    pub fn select(source: &SourceIdentifier) -> Transport {
        match source.kind() {
            SourceKind::Network => Transport::Network(NetworkTransport::new()),
            SourceKind::Filesystem => Transport::Filesystem,
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            Transport::Network(_) => SourceKind::Network,
            Transport::Filesystem => SourceKind::Filesystem,
        }
    }

    /// The run's agent, if this is a network transport that is still live.
    pub fn agent(&self) -> Option<&ureq::Agent> {
        match self {
            Transport::Network(net) => net.agent(),
            Transport::Filesystem => None,
        }
    }

    /// Releases the network resource, if any. Safe to call more than once.
    pub fn release(&mut self) {
        if let Transport::Network(net) = self {
            net.release();
        }
    }

    /// Release counter for network transports; `None` for filesystem.
    pub fn release_count(&self) -> Option<Arc<AtomicUsize>> {
        match self {
            Transport::Network(net) => Some(net.release_count()),
            Transport::Filesystem => None,
        }
    }
}
