use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use skiload_common::{LiftRide, Result, READ_NO_DATA_CODE, READ_SUCCESS_CODE, WRITE_SUCCESS_CODE};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::api::SkiApi;
use crate::latch::CompletionGuard;
use crate::phase::{PhaseProfile, SkierRange};
use crate::queue::StatsQueue;
use crate::sample::{CallKind, LatencySample, SampleBatch};

/// Success and failure tallies shared by every worker of a run.
#[derive(Debug, Default)]
pub struct RunCounters {
    success: AtomicU64,
    failure: AtomicU64,
}

impl RunCounters {
    pub fn record(&self, success: bool) {
        if success {
            self.success.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failure.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn successes(&self) -> u64 {
        self.success.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failure.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.successes() + self.failures()
    }
}

/// Everything one worker needs to know about its script.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerPlan {
    pub skiers: SkierRange,
    pub num_lifts: u32,
    pub resort_id: String,
    pub day_id: u32,
    pub profile: PhaseProfile,
}

/// Returns `true` if `status` counts as a successful `kind` call.
pub fn is_success(kind: CallKind, status: u16) -> bool {
    match kind {
        CallKind::WriteRide => status == WRITE_SUCCESS_CODE,
        CallKind::ReadDayVertical | CallKind::ReadResortTotals => {
            status == READ_SUCCESS_CODE || status == READ_NO_DATA_CODE
        }
    }
}

/// Draw a ride: skier from the worker's slice, lift from `1..=num_lifts`,
/// time from `[time_start, time_end)`.
pub fn random_ride(plan: &WorkerPlan, rng: &mut impl Rng) -> LiftRide {
    let lift_id = if plan.num_lifts == 0 { 1 } else { rng.gen_range(1..=plan.num_lifts) };
    let (start, end) = (f64::from(plan.profile.time_start), f64::from(plan.profile.time_end));
    let time = if start < end { rng.gen_range(start..end) } else { start };

    LiftRide {
        resort_id: plan.resort_id.clone(),
        day_id: plan.day_id.to_string(),
        skier_id: plan.skiers.pick(rng).to_string(),
        time: time.to_string(),
        lift_id: lift_id.to_string(),
    }
}

/// Runs one fixed call script: all writes, then the day-vertical reads, then
/// the resort-total reads, strictly one after another.
pub struct LoadWorker {
    plan: WorkerPlan,
    api: Arc<dyn SkiApi>,
    counters: Arc<RunCounters>,
    rng: StdRng,
}

impl LoadWorker {
    pub fn new(plan: WorkerPlan, api: Arc<dyn SkiApi>, counters: Arc<RunCounters>) -> Self {
        Self { plan, api, counters, rng: StdRng::from_entropy() }
    }

    /// Execute the script, report the batch, then release `completion`.
    pub async fn run(mut self, queue: StatsQueue, completion: CompletionGuard) {
        let batch = self.execute().await;
        debug!(rows = batch.len(), first_skier = self.plan.skiers.first, "worker finished");
        queue.push(batch);
        drop(completion);
    }

    /// Execute the script and return every recorded sample in call order.
    ///
    /// A call that gets any status back yields a sample, whether or not the
    /// status counts as success. A call that gets no answer is counted as a
    /// failure and leaves no sample. Nothing is retried.
    pub async fn execute(&mut self) -> SampleBatch {
        let profile = self.plan.profile;
        let capacity = usize::try_from(profile.calls_per_worker()).unwrap_or(0);
        let mut batch = Vec::with_capacity(capacity);
        let api = Arc::clone(&self.api);
        let day_id = self.plan.day_id.to_string();
        let resort_ids = vec![self.plan.resort_id.clone()];

        for _ in 0..profile.post_count {
            let ride = random_ride(&self.plan, &mut self.rng);
            let sample = self.timed(CallKind::WriteRide, api.write_ride(&ride)).await;
            batch.extend(sample);
        }

        for _ in 0..profile.get1_count {
            let skier_id = self.plan.skiers.pick(&mut self.rng).to_string();
            let call = api.read_day_vertical(&self.plan.resort_id, &day_id, &skier_id);
            let sample = self.timed(CallKind::ReadDayVertical, call).await;
            batch.extend(sample);
        }

        for _ in 0..profile.get2_count {
            let skier_id = self.plan.skiers.pick(&mut self.rng).to_string();
            let call = api.read_resort_totals(&skier_id, &resort_ids);
            let sample = self.timed(CallKind::ReadResortTotals, call).await;
            batch.extend(sample);
        }

        batch
    }

    async fn timed(&self, kind: CallKind, call: impl Future<Output = Result<u16>>) -> Option<LatencySample> {
        let start_ms = Utc::now().timestamp_millis();
        let started = Instant::now();

        match call.await {
            Ok(status) => {
                // Elapsed time comes from the monotonic clock, so end >= start.
                let end_ms = start_ms + started.elapsed().as_millis() as i64;
                self.counters.record(is_success(kind, status));
                Some(LatencySample { kind, status, start_ms, end_ms })
            }
            Err(e) => {
                self.counters.record(false);
                warn!(kind = %kind, api = self.api.name(), error = %e, "call failed");
                None
            }
        }
    }
}
