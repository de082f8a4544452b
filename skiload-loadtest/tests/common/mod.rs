#![allow(dead_code)]

use async_trait::async_trait;
use skiload_common::{LiftRide, Result, SkiLoadError};
use skiload_loadtest::api::SkiApi;
use skiload_loadtest::phase::PhaseProfile;
use skiload_loadtest::sample::CallKind;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// One call as seen by [`ScriptedApi`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub kind: CallKind,
    pub skier_id: u32,
    pub lift_id: Option<u32>,
    pub time: Option<f64>,
    pub resort_ids: Vec<String>,
}

/// In-process stand-in for the ski API with a fixed status per call kind.
pub struct ScriptedApi {
    pub write_status: u16,
    pub day_status: u16,
    pub totals_status: u16,
    /// Every n-th call (1-based, across all kinds) fails without a status.
    pub fail_every: Option<u64>,
    pub delay: Duration,
    calls: Mutex<Vec<RecordedCall>>,
    seen: AtomicU64,
}

impl ScriptedApi {
    pub fn new(write_status: u16, day_status: u16, totals_status: u16) -> Self {
        Self {
            write_status,
            day_status,
            totals_status,
            fail_every: None,
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            seen: AtomicU64::new(0),
        }
    }

    /// Answers every call with its success code.
    pub fn healthy() -> Self {
        Self::new(201, 200, 204)
    }

    pub fn failing_every(mut self, n: u64) -> Self {
        self.fail_every = Some(n);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    async fn answer(&self, call: RecordedCall, status: u16) -> Result<u16> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let n = self.seen.fetch_add(1, Ordering::SeqCst) + 1;
        self.calls.lock().unwrap().push(call);
        match self.fail_every {
            Some(every) if n % every == 0 => Err(SkiLoadError::NetworkError("connection reset".to_string())),
            _ => Ok(status),
        }
    }
}

#[async_trait]
impl SkiApi for ScriptedApi {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn write_ride(&self, ride: &LiftRide) -> Result<u16> {
        let call = RecordedCall {
            kind: CallKind::WriteRide,
            skier_id: ride.skier_id.parse().unwrap(),
            lift_id: Some(ride.lift_id.parse().unwrap()),
            time: Some(ride.time.parse().unwrap()),
            resort_ids: vec![ride.resort_id.clone()],
        };
        self.answer(call, self.write_status).await
    }

    async fn read_day_vertical(&self, resort_id: &str, _day_id: &str, skier_id: &str) -> Result<u16> {
        let call = RecordedCall {
            kind: CallKind::ReadDayVertical,
            skier_id: skier_id.parse().unwrap(),
            lift_id: None,
            time: None,
            resort_ids: vec![resort_id.to_string()],
        };
        self.answer(call, self.day_status).await
    }

    async fn read_resort_totals(&self, skier_id: &str, resort_ids: &[String]) -> Result<u16> {
        let call = RecordedCall {
            kind: CallKind::ReadResortTotals,
            skier_id: skier_id.parse().unwrap(),
            lift_id: None,
            time: None,
            resort_ids: resort_ids.to_vec(),
        };
        self.answer(call, self.totals_status).await
    }
}

pub fn profile(post_count: u32, get1_count: u32, get2_count: u32) -> PhaseProfile {
    PhaseProfile { time_start: 1, time_end: 90, post_count, get1_count, get2_count }
}
