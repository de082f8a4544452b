use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

use crate::sample::SampleBatch;

/// Message carried from workers to the persistence writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueItem {
    Batch(SampleBatch),
    /// No batch follows. Sent exactly once, after every worker has reported.
    End,
}

#[derive(Debug, Default)]
struct QueueState {
    batches: AtomicUsize,
    closed: AtomicBool,
}

/// Producer side of the sample queue: unbounded, multi-producer,
/// single-consumer. Clones share the same channel and counters.
#[derive(Debug, Clone)]
pub struct StatsQueue {
    tx: mpsc::UnboundedSender<QueueItem>,
    state: Arc<QueueState>,
}

pub type StatsReceiver = mpsc::UnboundedReceiver<QueueItem>;

impl StatsQueue {
    pub fn channel() -> (Self, StatsReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, state: Arc::default() }, rx)
    }

    /// Hand a worker's batch to the writer. If the writer has already stopped
    /// the batch is dropped with a warning; the worker carries on regardless.
    pub fn push(&self, batch: SampleBatch) {
        let rows = batch.len();
        if self.tx.send(QueueItem::Batch(batch)).is_err() {
            warn!(rows, "persistence writer has stopped, dropping batch");
            return;
        }
        self.state.batches.fetch_add(1, Ordering::Relaxed);
    }

    /// Enqueue the end marker. Only the first call sends it; returns whether
    /// this call did.
    pub fn close(&self) -> bool {
        if self.state.closed.swap(true, Ordering::AcqRel) {
            return false;
        }
        if self.tx.send(QueueItem::End).is_err() {
            warn!("persistence writer has stopped before the end marker");
        }
        true
    }

    /// Batches accepted so far, end marker excluded.
    pub fn batches_enqueued(&self) -> usize {
        self.state.batches.load(Ordering::Relaxed)
    }

    pub fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::Acquire)
    }
}
