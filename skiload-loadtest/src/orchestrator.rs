use skiload_common::{Result, SkiLoadError};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::api::SkiApi;
use crate::config::RunConfig;
use crate::latch::{CompletionGuard, CountdownLatch};
use crate::phase::{LoadPhase, PhasePlan, SkierRange};
use crate::queue::StatsQueue;
use crate::report::RunReport;
use crate::stats::StatisticsCalculator;
use crate::worker::{LoadWorker, RunCounters, WorkerPlan};
use crate::writer::{PersistenceWriter, WriterOutcome};

/// Drives a full three-phase run and produces its report.
pub struct Orchestrator {
    config: RunConfig,
    api: Arc<dyn SkiApi>,
}

impl Orchestrator {
    pub fn new(config: RunConfig, api: Arc<dyn SkiApi>) -> Self {
        Self { config, api }
    }

    pub fn plan(&self) -> PhasePlan {
        PhasePlan::new(self.config.max_threads, &self.config.phases)
    }

    /// Run every phase, then persist and summarise the samples.
    ///
    /// Each phase after the first starts once its predecessor's latch threshold
    /// of workers has finished; the run ends when every worker of every phase
    /// has. Only failing to open or read the latency log is fatal.
    pub async fn run(&self) -> Result<RunReport> {
        let plan = self.plan();
        let log_path = self.config.output_path();

        let writer = PersistenceWriter::create(&log_path).await?;
        let (queue, rx) = StatsQueue::channel();
        let writer_handle = tokio::spawn(writer.run(rx));

        let counters = Arc::new(RunCounters::default());
        let global = CountdownLatch::new(plan.total_workers() as usize);

        info!(
            max_threads = self.config.max_threads,
            total_workers = plan.total_workers(),
            planned_calls = plan.total_calls(),
            server = %self.config.server_address,
            api = self.api.name(),
            "load test starting"
        );
        let started = Instant::now();

        for phase in &plan.phases {
            let phase_latch = CountdownLatch::new(phase.latch_threshold as usize);
            info!(
                phase = phase.index,
                workers = phase.workers,
                latch_threshold = phase.latch_threshold,
                "phase starting"
            );
            self.launch_phase(phase, &queue, &counters, &phase_latch, &global);
            phase_latch.wait().await;
        }

        global.wait().await;
        let elapsed = started.elapsed();
        info!(elapsed_ms = elapsed.as_millis() as u64, "all workers finished");

        // Every worker pushed its batch before counting down, so nothing follows the end marker.
        queue.close();
        let batches_enqueued = queue.batches_enqueued();
        drop(queue);

        let outcome = join_writer(writer_handle).await;
        if !outcome.is_complete() {
            warn!(
                path = %log_path.display(),
                "latency log is partial; statistics cover only what was written"
            );
        }

        let calculator = StatisticsCalculator::new(&log_path);
        let stats = tokio::task::spawn_blocking(move || calculator.calculate())
            .await
            .map_err(|e| SkiLoadError::Persistence(format!("statistics task failed: {e}")))??;

        Ok(RunReport {
            max_threads: self.config.max_threads,
            successes: counters.successes(),
            failures: counters.failures(),
            elapsed,
            batches_enqueued,
            writer: outcome,
            log_path,
            stats,
        })
    }

    fn launch_phase(
        &self,
        phase: &LoadPhase,
        queue: &StatsQueue,
        counters: &Arc<RunCounters>,
        phase_latch: &CountdownLatch,
        global: &CountdownLatch,
    ) {
        for worker_index in 0..phase.workers {
            let plan = WorkerPlan {
                skiers: SkierRange::for_worker(worker_index, self.config.num_skiers, self.config.max_threads),
                num_lifts: self.config.num_lifts,
                resort_id: self.config.resort_id.clone(),
                day_id: self.config.ski_day,
                profile: phase.profile,
            };
            let worker = LoadWorker::new(plan, Arc::clone(&self.api), Arc::clone(counters));
            let completion = CompletionGuard::new(phase_latch.clone(), global.clone());
            tokio::spawn(worker.run(queue.clone(), completion));
        }
    }
}

async fn join_writer(handle: JoinHandle<WriterOutcome>) -> WriterOutcome {
    match handle.await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, "persistence writer task failed");
            WriterOutcome { error: Some(e.to_string()), ..WriterOutcome::default() }
        }
    }
}
