//! Persistence service: fire-and-forget dispatch of layout updates.
//!
//! DESIGN
//! ======
//! Every committed edit is submitted as one request, in its own spawned
//! task. Completions come back over an unbounded channel that the session
//! drains between input events, so event handling never waits on the store.
//! Several requests may be in flight at once and may complete in any order.
//!
//! The synchronizer tracks which requests are outstanding so the session can
//! wait for all of them before exiting. A structural completion carries the
//! authoritative layout; adopting it is the session's job.
//!
//! ERROR HANDLING
//! ==============
//! A failed request is logged and reported back as a failed completion. The
//! local edit is kept as is: no rollback and no retry. Without a store the
//! synchronizer is local-only and drops every request with a debug log.

#[cfg(test)]
#[path = "persistence_test.rs"]
mod tests;

use std::collections::BTreeSet;
use std::sync::Arc;

use designer::doc::Layout;
use designer::mutation::Mutation;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::store::{LayoutStore, StoreError};

/// Outcome of one submitted request.
#[derive(Debug)]
pub struct Completion {
    /// Submission order, starting at 1.
    pub seq: u64,
    pub op: &'static str,
    pub structural: bool,
    pub result: Result<Option<Layout>, StoreError>,
}

pub struct Synchronizer {
    store: Option<Arc<dyn LayoutStore>>,
    layout_id: Uuid,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    pending: BTreeSet<u64>,
    next_seq: u64,
}

impl Synchronizer {
    #[must_use]
    pub fn new(store: Arc<dyn LayoutStore>, layout_id: Uuid) -> Self {
        Self::build(Some(store), layout_id)
    }

    /// A synchronizer with autosave disabled.
    #[must_use]
    pub fn local_only() -> Self {
        Self::build(None, Uuid::nil())
    }

    fn build(store: Option<Arc<dyn LayoutStore>>, layout_id: Uuid) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { store, layout_id, tx, rx, pending: BTreeSet::new(), next_seq: 1 }
    }

    #[must_use]
    pub fn is_local_only(&self) -> bool {
        self.store.is_none()
    }

    /// Requests submitted whose completion has not been taken yet.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    /// Send one request to the store in a background task.
    ///
    /// Returns the task handle, or `None` when running local-only.
    pub fn submit(&mut self, mutation: Mutation) -> Option<JoinHandle<()>> {
        let Some(store) = self.store.clone() else {
            debug!(op = mutation.op(), "autosave disabled; request dropped");
            return None;
        };
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.insert(seq);

        let (tx, layout_id) = (self.tx.clone(), self.layout_id);
        debug!(seq, op = mutation.op(), layout_id = %layout_id, "request submitted");
        Some(tokio::spawn(async move {
            let result = store.apply(layout_id, &mutation).await;
            let completion = Completion { seq, op: mutation.op(), structural: mutation.is_structural(), result };
            if tx.send(completion).is_err() {
                debug!(seq, "session gone before completion");
            }
        }))
    }

    /// Take one completion if any has arrived.
    pub fn try_completion(&mut self) -> Option<Completion> {
        let Ok(completion) = self.rx.try_recv() else {
            return None;
        };
        Some(self.settle(completion))
    }

    /// Wait for the next completion; `None` once nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        if self.in_flight() == 0 {
            return None;
        }
        let completion = self.rx.recv().await?;
        Some(self.settle(completion))
    }

    fn settle(&mut self, completion: Completion) -> Completion {
        self.pending.remove(&completion.seq);
        match &completion.result {
            Ok(layout) => info!(
                seq = completion.seq,
                op = completion.op,
                authoritative = layout.is_some(),
                "request persisted"
            ),
            Err(e) => error!(seq = completion.seq, op = completion.op, error = %e, "request failed"),
        }
        completion
    }
}
