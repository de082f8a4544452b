use skiload_common::{Result, SkiLoadError};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::sample::CallKind;

/// Reported for every metric of a category that has no samples.
pub const NO_DATA: i64 = -1;

/// Largest latency accepted from a log row: one hour. Rows above it are treated
/// as corrupt, which also bounds each histogram's size.
pub const MAX_LATENCY_MS: u64 = 3_600_000;

pub const MEDIAN: f64 = 0.5;
pub const P99: f64 = 0.99;

const FIELD_COUNT: usize = 5;
const KIND_COL: usize = 0;
const LATENCY_COL: usize = 4;

/// Aggregate latency figures for one call kind, in milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryStats {
    pub count: u64,
    pub sum_ms: u64,
    pub max_ms: i64,
    pub mean_ms: f64,
    pub median_ms: i64,
    pub p99_ms: i64,
}

impl CategoryStats {
    fn empty() -> Self {
        Self {
            count: 0,
            sum_ms: 0,
            max_ms: NO_DATA,
            mean_ms: NO_DATA as f64,
            median_ms: NO_DATA,
            p99_ms: NO_DATA,
        }
    }
}

/// Statistics for every call kind, derived from one latency log.
#[derive(Debug, Clone, PartialEq)]
pub struct LatencyStats {
    categories: [CategoryStats; 3],
    /// Data rows that contributed to the figures.
    pub rows: u64,
    /// Lines that could not be parsed (e.g. a truncated final line).
    pub skipped_lines: u64,
}

impl LatencyStats {
    pub fn get(&self, kind: CallKind) -> &CategoryStats {
        &self.categories[kind.index()]
    }
}

/// Occurrence counts indexed by latency, sized to the largest latency seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountingHistogram {
    counts: Vec<u64>,
}

impl CountingHistogram {
    /// Buckets for `0..=max_latency`, capped at [`MAX_LATENCY_MS`].
    pub fn with_max(max_latency: u64) -> Self {
        let len = max_latency.min(MAX_LATENCY_MS) as usize + 1;
        Self { counts: vec![0; len] }
    }

    /// Count one occurrence; returns `false` if `latency` exceeds the histogram.
    pub fn record(&mut self, latency: u64) -> bool {
        match self.counts.get_mut(latency as usize) {
            Some(slot) => {
                *slot += 1;
                true
            }
            None => false,
        }
    }

    /// Descending order-statistic scan.
    ///
    /// With `k = round(total · p)`, walks buckets from the highest latency down,
    /// dropping each bucket's count from a running total that starts at `total`,
    /// and returns the first latency at which the running total is `<= k`: the
    /// highest latency with at most `k` samples strictly below it. Returns
    /// [`NO_DATA`] when no bucket qualifies.
    pub fn order_statistic(&self, total: u64, p: f64) -> i64 {
        let k = (total as f64 * p).round() as u64;
        let mut remaining = total;
        for (latency, &count) in self.counts.iter().enumerate().rev() {
            remaining = remaining.saturating_sub(count);
            if remaining <= k {
                return latency as i64;
            }
        }
        NO_DATA
    }
}

/// Pass-one accumulator for one kind.
#[derive(Debug, Clone, Copy, Default)]
struct RunningTotals {
    count: u64,
    sum: u64,
    max: Option<u64>,
}

/// Derives [`LatencyStats`] from a latency log without holding its rows in memory.
///
/// The log is streamed twice: once for counts, sums and maxima, then again to
/// fill one [`CountingHistogram`] per kind, from which median and p99 are read.
/// Memory is bounded by the latency range rather than the number of samples.
pub struct StatisticsCalculator {
    path: PathBuf,
}

impl StatisticsCalculator {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn calculate(&self) -> Result<LatencyStats> {
        let (totals, rows, skipped_lines) = self.mean_and_max_pass()?;
        let histograms = self.histogram_pass(&totals)?;

        let mut categories = [CategoryStats::empty(), CategoryStats::empty(), CategoryStats::empty()];
        for kind in CallKind::ALL {
            let t = &totals[kind.index()];
            let (Some(max), Some(histogram)) = (t.max, &histograms[kind.index()]) else {
                continue;
            };
            categories[kind.index()] = CategoryStats {
                count: t.count,
                sum_ms: t.sum,
                max_ms: max as i64,
                mean_ms: t.sum as f64 / t.count as f64,
                median_ms: histogram.order_statistic(t.count, MEDIAN),
                p99_ms: histogram.order_statistic(t.count, P99),
            };
        }

        debug!(path = %self.path.display(), rows, skipped_lines, "latency statistics calculated");
        Ok(LatencyStats { categories, rows, skipped_lines })
    }

    fn mean_and_max_pass(&self) -> Result<([RunningTotals; 3], u64, u64)> {
        let mut totals = [RunningTotals::default(); 3];
        let mut rows = 0;
        let mut skipped = 0;

        for (line_no, line) in self.data_lines()? {
            let line = line.map_err(|e| self.read_error(e))?;
            match parse_row(&line) {
                Ok((kind, latency)) => {
                    let t = &mut totals[kind.index()];
                    t.count += 1;
                    t.sum = t.sum.saturating_add(latency);
                    t.max = Some(t.max.map_or(latency, |m| m.max(latency)));
                    rows += 1;
                }
                Err(e) => {
                    warn!(
                        path = %self.path.display(),
                        line = line_no,
                        error = %e,
                        "skipping latency log line"
                    );
                    skipped += 1;
                }
            }
        }
        Ok((totals, rows, skipped))
    }

    fn histogram_pass(&self, totals: &[RunningTotals; 3]) -> Result<[Option<CountingHistogram>; 3]> {
        let mut histograms = totals.map(|t| t.max.map(CountingHistogram::with_max));

        for (_, line) in self.data_lines()? {
            let line = line.map_err(|e| self.read_error(e))?;
            // Unparseable lines were already reported by the first pass.
            let Ok((kind, latency)) = parse_row(&line) else {
                continue;
            };
            if let Some(histogram) = histograms[kind.index()].as_mut() {
                histogram.record(latency);
            }
        }
        Ok(histograms)
    }

    /// Lines after the header, numbered from 2 as they appear in the file.
    fn data_lines(&self) -> Result<impl Iterator<Item = (usize, std::io::Result<String>)>> {
        let file = File::open(&self.path).map_err(|e| self.read_error(e))?;
        let lines: Lines<BufReader<File>> = BufReader::new(file).lines();
        Ok(lines.enumerate().skip(1).map(|(i, line)| (i + 1, line)))
    }

    fn read_error(&self, e: std::io::Error) -> SkiLoadError {
        SkiLoadError::Persistence(format!("{}: {e}", self.path.display()))
    }
}

/// Extract the call kind and latency from one data line.
pub fn parse_row(line: &str) -> Result<(CallKind, u64)> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != FIELD_COUNT {
        return Err(SkiLoadError::MalformedRecord(format!(
            "expected {FIELD_COUNT} fields, found {}",
            fields.len()
        )));
    }
    let kind: CallKind = fields[KIND_COL].parse()?;
    let latency = fields[LATENCY_COL]
        .trim()
        .parse::<u64>()
        .map_err(|e| SkiLoadError::MalformedRecord(format!("latency {:?}: {e}", fields[LATENCY_COL])))?;
    if latency > MAX_LATENCY_MS {
        return Err(SkiLoadError::MalformedRecord(format!(
            "latency {latency} ms exceeds {MAX_LATENCY_MS} ms"
        )));
    }
    Ok((kind, latency))
}
