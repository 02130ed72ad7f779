use std::fs;

use tracing::warn;
use url::Url;

use crate::errors::{ResolveError, Result};
use crate::transport::{new_agent, Transport};
use crate::types::{DocumentLocation, SourceIdentifier};

/// Raw text of a document together with where it came from.
#[derive(Debug, Clone)]
pub struct AcquiredDocument {
    pub text: String,
    pub location: DocumentLocation,
}

/// Retrieves the raw text of the root document. Single attempt, no retry.
pub fn acquire(source: &SourceIdentifier, transport: &Transport) -> Result<AcquiredDocument> {
    let location = source.location()?;
    let text = fetch_location(&location, transport)?;
    Ok(AcquiredDocument { text, location })
}

/// Reads the text at a location, using the run's agent for URLs when one is
/// live.
///
/// Filesystem runs that reach a URL (an absolute external reference) use a
/// short-lived agent that is dropped as soon as the body has been read.
pub fn fetch_location(location: &DocumentLocation, transport: &Transport) -> Result<String> {
    match location {
        DocumentLocation::Url(url) => match transport.agent() {
            Some(agent) => fetch_url(agent, url),
            None => fetch_url(&new_agent(), url),
        },
        DocumentLocation::Path(path) => {
            warn!("reading {}", path.display());
            fs::read_to_string(path).map_err(|e| ResolveError::Acquisition {
                message: format!("failed to read file: {e}"),
                source_id: path.display().to_string(),
            })
        }
    }
}

fn fetch_url(agent: &ureq::Agent, url: &Url) -> Result<String> {
    warn!("GET {}", url);

    let mut response = agent
        .get(url.as_str())
        .call()
        .map_err(|e| ResolveError::Acquisition {
            message: format!("request failed: {e}"),
            source_id: url.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ResolveError::Acquisition {
            message: format!("received status code {}", status.as_u16()),
            source_id: url.to_string(),
        });
    }

    // No size cap on documents.
    response
        .body_mut()
        .with_config()
        .limit(u64::MAX)
        .read_to_string()
        .map_err(|e| ResolveError::Acquisition {
            message: format!("failed to read response body: {e}"),
            source_id: url.to_string(),
        })
}
