//! Draft client - read and update one editorial draft by id

use crate::backend::{BackendEndpoint, BackendKind, HttpToolBackend};
use crate::error::{Error, Result};
use reqwest::Method;
use serde_json::Value;
use tracing::instrument;

const DRAFTS_PATH: &str = "drafts";

/// Client for the draft backend.
///
/// Shares the HTTP backend client, so failures use the same taxonomy as
/// tool dispatch.
#[derive(Debug)]
pub struct DraftClient {
    backend: HttpToolBackend,
}

impl DraftClient {
    /// Build a client for the draft endpoint.
    ///
    /// # Errors
    ///
    /// `Configuration` if the endpoint is not a draft endpoint or its URL is invalid.
    pub fn new(endpoint: BackendEndpoint) -> Result<Self> {
        if endpoint.kind != BackendKind::Draft {
            return Err(Error::Configuration(format!(
                "draft client needs a draft endpoint, got {}",
                endpoint.kind
            )));
        }
        Ok(Self {
            backend: HttpToolBackend::new(endpoint)?,
        })
    }

    /// Fetch a draft
    #[instrument(skip(self))]
    pub async fn get_draft(&self, id: &str) -> Result<Value> {
        validate_id(id)?;
        self.backend
            .request(Method::GET, &[DRAFTS_PATH, id], None)
            .await
    }

    /// Apply `patch` to a draft and return the backend's updated draft
    #[instrument(skip(self, patch))]
    pub async fn update_draft(&self, id: &str, patch: Value) -> Result<Value> {
        validate_id(id)?;
        if !patch.is_object() {
            return Err(Error::InvalidPayload {
                backend: BackendKind::Draft,
                message: "draft patch must be a JSON object".to_string(),
            });
        }
        self.backend
            .request(Method::PATCH, &[DRAFTS_PATH, id], Some(&patch))
            .await
    }
}

fn validate_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(Error::InvalidPayload {
            backend: BackendKind::Draft,
            message: "draft id must not be empty".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests;
