use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::sample::CallKind;
use crate::stats::LatencyStats;
use crate::writer::WriterOutcome;

/// Outcome of a full run, as printed at the end.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub max_threads: u32,
    pub successes: u64,
    pub failures: u64,
    pub elapsed: Duration,
    pub batches_enqueued: usize,
    pub writer: WriterOutcome,
    pub log_path: PathBuf,
    pub stats: LatencyStats,
}

impl RunReport {
    pub fn requests_total(&self) -> u64 {
        self.successes + self.failures
    }

    pub fn wall_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Completed calls per wall-clock second; 0 for a run that took no time.
    pub fn throughput_rps(&self) -> f64 {
        let secs = self.wall_secs();
        if secs > 0.0 {
            self.requests_total() as f64 / secs
        } else {
            0.0
        }
    }

    pub fn log_complete(&self) -> bool {
        self.writer.is_complete()
    }
}

fn kind_title(kind: CallKind) -> &'static str {
    match kind {
        CallKind::WriteRide => "POST",
        CallKind::ReadDayVertical => "GET day vertical",
        CallKind::ReadResortTotals => "GET resort totals",
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SkiLoad Results")?;
        writeln!(f, "===============")?;
        writeln!(f, "Max threads:           {}", self.max_threads)?;
        writeln!(f, "Successful requests:   {}", self.successes)?;
        writeln!(f, "Failed requests:       {}", self.failures)?;
        writeln!(f, "Wall time:             {:.3} s", self.wall_secs())?;
        writeln!(f, "Throughput:            {:.1} req/s", self.throughput_rps())?;
        writeln!(f, "Latency log:           {}", self.log_path.display())?;
        if !self.log_complete() {
            writeln!(
                f,
                "WARNING: latency log is partial ({} rows flushed); figures below cover only those rows",
                self.writer.rows_written
            )?;
        }
        if self.stats.skipped_lines > 0 {
            writeln!(f, "Unreadable log lines:  {}", self.stats.skipped_lines)?;
        }

        for kind in CallKind::ALL {
            let s = self.stats.get(kind);
            let title = kind_title(kind);
            writeln!(f)?;
            writeln!(f, "{title} ({} samples)", s.count)?;
            writeln!(f, "  Mean response time:    {:.2} ms", s.mean_ms)?;
            writeln!(f, "  Median response time:  {} ms", s.median_ms)?;
            writeln!(f, "  Max response time:     {} ms", s.max_ms)?;
            writeln!(f, "  P99 response time:     {} ms", s.p99_ms)?;
        }
        Ok(())
    }
}
