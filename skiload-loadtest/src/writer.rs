use skiload_common::{Result, SkiLoadError};
use std::io;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{error, info};

use crate::queue::{QueueItem, StatsReceiver};
use crate::sample::LatencySample;

/// First line of every latency log.
pub const LOG_HEADER: &str = "RequestMethod,ResponseCode,StartTimeStamp,EndTimeStamp,Latency";

/// What the writer managed to persist before it stopped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriterOutcome {
    pub batches_written: usize,
    /// Rows of batches that were written and flushed in full. Rows of a batch
    /// that failed part way are not counted.
    pub rows_written: usize,
    /// Set when a write failed; the log on disk is then partial.
    pub error: Option<String>,
}

impl WriterOutcome {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Sole owner of the latency log while a run is in progress.
pub struct PersistenceWriter<W = BufWriter<File>> {
    /// Names the sink in log lines and errors.
    label: String,
    out: W,
}

impl PersistenceWriter<BufWriter<File>> {
    /// Create (or truncate) the log at `path` and write the header. A run cannot
    /// proceed without it, so failure here is fatal to the caller.
    pub async fn create(path: impl AsRef<Path>) -> Result<Self> {
        let label = path.as_ref().display().to_string();
        let file = File::create(path.as_ref())
            .await
            .map_err(|e| SkiLoadError::Persistence(format!("{label}: {e}")))?;
        Self::from_writer(label, BufWriter::new(file)).await
    }
}

impl<W: AsyncWrite + Unpin> PersistenceWriter<W> {
    /// Use `out` as the log sink, writing and flushing the header first.
    pub async fn from_writer(label: impl Into<String>, mut out: W) -> Result<Self> {
        let label = label.into();
        let header = format!("{LOG_HEADER}\n");
        let written = async {
            out.write_all(header.as_bytes()).await?;
            out.flush().await
        };
        if let Err(e) = written.await {
            return Err(SkiLoadError::Persistence(format!("{label}: {e}")));
        }
        Ok(Self { label, out })
    }

    /// Drain the queue into the log until the end marker arrives or every
    /// producer is gone. Each batch is flushed once written. A failed write
    /// stops the loop and drops the receiver, so later pushes are discarded.
    pub async fn run(mut self, mut rx: StatsReceiver) -> WriterOutcome {
        let mut outcome = WriterOutcome::default();

        while let Some(item) = rx.recv().await {
            let batch = match item {
                QueueItem::End => break,
                QueueItem::Batch(batch) => batch,
            };
            if let Err(e) = self.write_batch(&batch).await {
                error!(
                    sink = %self.label,
                    error = %e,
                    rows_written = outcome.rows_written,
                    "latency log write failed"
                );
                outcome.error = Some(e.to_string());
                return outcome;
            }
            outcome.batches_written += 1;
            outcome.rows_written += batch.len();
        }

        info!(
            sink = %self.label,
            batches = outcome.batches_written,
            rows = outcome.rows_written,
            "latency log closed"
        );
        outcome
    }

    async fn write_batch(&mut self, batch: &[LatencySample]) -> io::Result<()> {
        for sample in batch {
            self.out.write_all(format_line(sample).as_bytes()).await?;
        }
        self.out.flush().await
    }
}

/// One log line, newline included.
pub fn format_line(sample: &LatencySample) -> String {
    format!(
        "{},{},{},{},{}\n",
        sample.kind.label(),
        sample.status,
        sample.start_ms,
        sample.end_ms,
        sample.latency_ms()
    )
}
