use skiload_common::SkiLoadError;
use std::fmt;
use std::str::FromStr;

/// The three calls a worker issues against the ski API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    WriteRide,
    ReadDayVertical,
    ReadResortTotals,
}

impl CallKind {
    /// Every kind, in the order a worker issues them.
    pub const ALL: [CallKind; 3] = [
        CallKind::WriteRide,
        CallKind::ReadDayVertical,
        CallKind::ReadResortTotals,
    ];

    /// Label written to the `RequestMethod` column of the latency log.
    pub fn label(&self) -> &'static str {
        match self {
            CallKind::WriteRide => "POST",
            CallKind::ReadDayVertical => "GET1",
            CallKind::ReadResortTotals => "GET2",
        }
    }

    /// Position in [`CallKind::ALL`]; used to index per-kind arrays.
    pub fn index(&self) -> usize {
        match self {
            CallKind::WriteRide => 0,
            CallKind::ReadDayVertical => 1,
            CallKind::ReadResortTotals => 2,
        }
    }
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CallKind {
    type Err = SkiLoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "POST" => Ok(CallKind::WriteRide),
            "GET1" => Ok(CallKind::ReadDayVertical),
            "GET2" => Ok(CallKind::ReadResortTotals),
            other => Err(SkiLoadError::MalformedRecord(format!("unknown request method {other:?}"))),
        }
    }
}

/// One completed call. Timestamps are Unix epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencySample {
    pub kind: CallKind,
    pub status: u16,
    pub start_ms: i64,
    pub end_ms: i64,
}

impl LatencySample {
    pub fn latency_ms(&self) -> u64 {
        (self.end_ms - self.start_ms).max(0) as u64
    }
}

/// Every sample one worker recorded, in call order.
pub type SampleBatch = Vec<LatencySample>;
