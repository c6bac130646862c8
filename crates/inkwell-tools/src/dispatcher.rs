//! Tool dispatcher - fixed tool identifiers routed to backends
//!
//! The dispatcher is stateless apart from its routing table. It never touches
//! the workflow store or the event bus; recording an invocation as a workflow
//! event is left to the caller.

use crate::backend::{BackendEndpoint, BackendKind, HttpToolBackend, ToolBackend};
use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Research query tool
pub const RESEARCH_SEARCH: &str = "research:search";
/// SEO analysis tool
pub const SEO_ANALYZE: &str = "seo:analyze";
/// Asset upload tool
pub const STORAGE_UPLOAD: &str = "storage:upload";

/// Describes one dispatchable tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolInfo {
    /// Tool identifier, e.g. `storage:upload`
    pub name: &'static str,
    /// Backend that serves it
    pub backend: BackendKind,
    /// Short description
    pub description: &'static str,
}

static CATALOG: [ToolInfo; 3] = [
    ToolInfo {
        name: RESEARCH_SEARCH,
        backend: BackendKind::Research,
        description: "Run a research query and return sources with summaries",
    },
    ToolInfo {
        name: SEO_ANALYZE,
        backend: BackendKind::Seo,
        description: "Analyze a draft for keywords, readability and metadata",
    },
    ToolInfo {
        name: STORAGE_UPLOAD,
        backend: BackendKind::Storage,
        description: "Upload an asset ({path, contentType, data}) and return its URL",
    },
];

/// Routes tool identifiers to their backend clients
#[derive(Clone)]
pub struct ToolDispatcher {
    backends: HashMap<BackendKind, Arc<dyn ToolBackend>>,
}

impl ToolDispatcher {
    /// Create a dispatcher over one backend per tool
    #[must_use]
    pub fn new(
        research: Arc<dyn ToolBackend>,
        seo: Arc<dyn ToolBackend>,
        storage: Arc<dyn ToolBackend>,
    ) -> Self {
        let backends = HashMap::from([
            (BackendKind::Research, research),
            (BackendKind::Seo, seo),
            (BackendKind::Storage, storage),
        ]);
        Self { backends }
    }

    /// Create a dispatcher with an HTTP client per endpoint.
    ///
    /// # Errors
    ///
    /// `Configuration` if any endpoint cannot produce a client.
    pub fn from_endpoints(
        research: BackendEndpoint,
        seo: BackendEndpoint,
        storage: BackendEndpoint,
    ) -> Result<Self> {
        Ok(Self::new(
            Arc::new(HttpToolBackend::new(research)?),
            Arc::new(HttpToolBackend::new(seo)?),
            Arc::new(HttpToolBackend::new(storage)?),
        ))
    }

    /// The fixed set of tools this dispatcher accepts
    #[must_use]
    pub fn catalog() -> &'static [ToolInfo] {
        &CATALOG
    }

    /// Look up a tool by identifier
    #[must_use]
    pub fn tool(name: &str) -> Option<&'static ToolInfo> {
        CATALOG.iter().find(|tool| tool.name == name)
    }

    /// Forward `payload` to the backend serving `tool` and return its result.
    ///
    /// # Errors
    ///
    /// `ToolNotFound` for an unknown identifier (no call is made); otherwise
    /// whatever the backend call reports. Nothing is retried.
    #[instrument(skip(self, payload))]
    pub async fn dispatch(&self, tool: &str, payload: Value) -> Result<Value> {
        let Some((info, backend)) = Self::tool(tool)
            .and_then(|info| self.backends.get(&info.backend).map(|b| (info, b)))
        else {
            warn!(tool = %tool, "Unknown tool requested");
            return Err(Error::ToolNotFound(tool.to_string()));
        };

        let start = Instant::now();
        let result = backend.invoke(payload).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => info!(tool = %tool, backend = %info.backend, duration_ms, "Tool dispatched"),
            Err(e) => warn!(
                tool = %tool,
                backend = %info.backend,
                duration_ms,
                error = %e,
                "Tool dispatch failed"
            ),
        }
        result
    }
}

impl std::fmt::Debug for ToolDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDispatcher")
            .field("tools", &CATALOG.iter().map(|t| t.name).collect::<Vec<_>>())
            .finish()
    }
}
