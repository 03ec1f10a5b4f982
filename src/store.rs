//! Layout store client.
//!
//! DESIGN
//! ======
//! [`LayoutStore`] is the seam between the editor session and durable
//! storage. The store accepts one partial-update request at a time, keyed by
//! layout id. For structural requests it answers with the authoritative
//! layout, which the session adopts in place of its local copy.
//!
//! [`HttpStore`] talks JSON over HTTP: `GET {base}/layouts/{id}` and
//! `PATCH {base}/layouts/{id}` with a [`Mutation`] body. [`MemoryStore`] runs
//! the same apply logic as the editor against an in-memory map, for offline
//! sessions and tests.

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use designer::DesignerError;
use designer::doc::Layout;
use designer::mutation::{self, Mutation};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

const CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
    #[error("store request failed: {0}")]
    Request(String),
    #[error("store responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("store response decode failed: {0}")]
    Decode(String),
    #[error("layout {0} not found")]
    NotFound(Uuid),
    #[error("store rejected the request: {0}")]
    Rejected(#[from] DesignerError),
}

#[async_trait::async_trait]
pub trait LayoutStore: Send + Sync {
    /// Load the full layout snapshot.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] for an unknown id; transport and decode
    /// failures otherwise.
    async fn fetch_layout(&self, id: Uuid) -> Result<Layout, StoreError>;

    /// Apply one partial update. Returns the authoritative layout when the
    /// store sends one back (always for structural requests).
    ///
    /// # Errors
    ///
    /// Transport, status, decode or rejection failures.
    async fn apply(&self, id: Uuid, mutation: &Mutation) -> Result<Option<Layout>, StoreError>;
}

// =============================================================================
// HTTP
// =============================================================================

pub struct HttpStore {
    http: reqwest::Client,
    base_url: String,
}

impl HttpStore {
    /// # Errors
    ///
    /// [`StoreError::HttpClientBuild`] if the client cannot be constructed.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| StoreError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_string() })
    }

    #[must_use]
    pub fn layout_url(&self, id: Uuid) -> String {
        format!("{}/layouts/{id}", self.base_url)
    }

    async fn send(&self, request: reqwest::RequestBuilder, id: Uuid) -> Result<String, StoreError> {
        let response = request.send().await.map_err(|e| StoreError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| StoreError::Request(e.to_string()))?;
        match status {
            200..=299 => Ok(text),
            404 => Err(StoreError::NotFound(id)),
            _ => Err(StoreError::Status { status, body: text }),
        }
    }
}

#[async_trait::async_trait]
impl LayoutStore for HttpStore {
    async fn fetch_layout(&self, id: Uuid) -> Result<Layout, StoreError> {
        let text = self.send(self.http.get(self.layout_url(id)), id).await?;
        parse_layout(&text)
    }

    async fn apply(&self, id: Uuid, mutation: &Mutation) -> Result<Option<Layout>, StoreError> {
        let text = self.send(self.http.patch(self.layout_url(id)).json(mutation), id).await?;
        parse_patch_response(&text)
    }
}

#[derive(serde::Deserialize)]
struct PatchResponse {
    #[serde(default)]
    layout: Option<Layout>,
}

fn parse_layout(json: &str) -> Result<Layout, StoreError> {
    let layout: Layout = serde_json::from_str(json).map_err(|e| StoreError::Decode(e.to_string()))?;
    layout.validate()?;
    Ok(layout)
}

/// An empty body or `{}` acknowledges the update; `{"layout": ...}` carries
/// the authoritative layout.
fn parse_patch_response(json: &str) -> Result<Option<Layout>, StoreError> {
    if json.trim().is_empty() {
        return Ok(None);
    }
    let response: PatchResponse = serde_json::from_str(json).map_err(|e| StoreError::Decode(e.to_string()))?;
    if let Some(layout) = &response.layout {
        layout.validate()?;
    }
    Ok(response.layout)
}

// =============================================================================
// MEMORY
// =============================================================================

#[derive(Default)]
pub struct MemoryStore {
    layouts: RwLock<HashMap<Uuid, Layout>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    /// A store holding one layout under `id`.
    #[must_use]
    pub fn with_layout(id: Uuid, layout: Layout) -> Self {
        Self { layouts: RwLock::new(HashMap::from([(id, layout)])), unavailable: AtomicBool::new(false) }
    }

    /// Current stored copy.
    pub async fn snapshot(&self, id: Uuid) -> Option<Layout> {
        self.layouts.read().await.get(&id).cloned()
    }

    /// Make every subsequent request fail as if the store were unreachable.
    #[cfg(test)]
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Request("store unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl LayoutStore for MemoryStore {
    async fn fetch_layout(&self, id: Uuid) -> Result<Layout, StoreError> {
        self.check_available()?;
        self.layouts.read().await.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    async fn apply(&self, id: Uuid, mutation: &Mutation) -> Result<Option<Layout>, StoreError> {
        self.check_available()?;
        let mut layouts = self.layouts.write().await;
        let layout = layouts.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        mutation::apply(layout, mutation)?;
        debug!(layout_id = %id, op = mutation.op(), "memory store applied update");
        Ok(mutation.is_structural().then(|| layout.clone()))
    }
}
