use dt_core::{ChapterRecord, DtError, Language, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

/// Records collected from one source, in arrival order.
#[derive(Debug, Clone)]
pub struct SourceBuffer {
    pub source_id: String,
    pub language: Language,
    pub records: Vec<ChapterRecord>,
}

struct Slot {
    source_id: String,
    language: Language,
    records: Vec<ChapterRecord>,
    done: bool,
}

struct RegistryState {
    slots: Vec<Slot>,
    cancelled: bool,
}

impl RegistryState {
    fn done_count(&self) -> usize {
        self.slots.iter().filter(|s| s.done).count()
    }
}

/// Run-scoped shared registry the collectors append into.
///
/// Constructed once per run with the expected collector count, handed
/// by reference to every collector, and torn down with the run. Nothing
/// downstream observes a partial collector's data: `await_all` releases
/// only after every expected collector has signaled done.
pub struct CollectionRegistry {
    expected: usize,
    state: Mutex<RegistryState>,
    notify: Notify,
}

impl CollectionRegistry {
    /// Declare how many independent collectors will participate.
    pub fn new(expected: usize) -> Arc<Self> {
        Arc::new(Self {
            expected,
            state: Mutex::new(RegistryState {
                slots: Vec::with_capacity(expected),
                cancelled: false,
            }),
            notify: Notify::new(),
        })
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Issue the append/signal endpoint for one collector.
    pub async fn handle(
        self: &Arc<Self>,
        source_id: impl Into<String>,
        language: Language,
    ) -> CollectorHandle {
        let mut state = self.state.lock().await;
        let slot = state.slots.len();
        let source_id = source_id.into();
        debug!(source = %source_id, %language, slot, "collector registered");
        state.slots.push(Slot {
            source_id,
            language,
            records: Vec::new(),
            done: false,
        });
        CollectorHandle { registry: Arc::clone(self), slot }
    }

    /// Suspend until every registered collector has signaled done, then
    /// return the per-source buffers in registration order.
    ///
    /// On timeout, all partially collected data is discarded and the
    /// run fails with [`DtError::IncompleteCollection`]; there is no
    /// silent partial pairing.
    pub async fn await_all(&self, wait: Duration) -> Result<Vec<SourceBuffer>> {
        let deadline = Instant::now() + wait;
        loop {
            // Register interest before inspecting state, so a signal
            // landing between the check and the await is not lost.
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            {
                let mut state = self.state.lock().await;
                if state.slots.len() == self.expected && state.done_count() == self.expected {
                    let buffers: Vec<SourceBuffer> = state
                        .slots
                        .drain(..)
                        .map(|slot| SourceBuffer {
                            source_id: slot.source_id,
                            language: slot.language,
                            records: slot.records,
                        })
                        .collect();
                    info!(
                        sources = buffers.len(),
                        records = buffers.iter().map(|b| b.records.len()).sum::<usize>(),
                        "all collectors completed"
                    );
                    return Ok(buffers);
                }
            }
            if timeout_at(deadline, notified).await.is_err() {
                let mut state = self.state.lock().await;
                let done = state.done_count();
                state.cancelled = true;
                for slot in &mut state.slots {
                    slot.records.clear();
                }
                warn!(done, expected = self.expected, "collection wait expired, discarding partial data");
                return Err(DtError::IncompleteCollection { done, expected: self.expected });
            }
        }
    }
}

/// Cloneable append/signal endpoint for one collector.
///
/// `append` calls from different collectors may interleave freely; each
/// call is serialized through the registry lock, and per-source arrival
/// order is exactly the order of that collector's own calls.
#[derive(Clone)]
pub struct CollectorHandle {
    registry: Arc<CollectionRegistry>,
    slot: usize,
}

impl CollectorHandle {
    /// Append one record to this collector's buffer, stamping its
    /// arrival order.
    pub async fn append(&self, mut record: ChapterRecord) {
        let mut state = self.registry.state.lock().await;
        if state.cancelled {
            debug!("append after cancellation dropped");
            return;
        }
        // Slots are drained once the barrier releases; a straggler
        // appending after that has nothing to append into.
        let Some(slot) = state.slots.get_mut(self.slot) else {
            return;
        };
        record.arrival_order = slot.records.len();
        slot.records.push(record);
    }

    /// Terminal completion signal. Exactly one per collector; a repeat
    /// is ignored with a warning.
    pub async fn signal_done(&self) {
        {
            let mut state = self.registry.state.lock().await;
            if state.cancelled {
                return;
            }
            let Some(slot) = state.slots.get_mut(self.slot) else {
                return;
            };
            if slot.done {
                warn!(source = %slot.source_id, "duplicate completion signal ignored");
                return;
            }
            slot.done = true;
            debug!(source = %slot.source_id, records = slot.records.len(), "collector done");
        }
        self.registry.notify.notify_waiters();
    }
}
