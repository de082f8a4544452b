use rand::Rng;
use serde::{Deserialize, Serialize};

/// Workers in phases one and three are `max_threads / PHASE_DIVISOR`; so is the
/// skier slice divisor.
pub const PHASE_DIVISOR: u32 = 4;

/// Shape of one load phase: the simulated-minute band ride times are drawn from
/// and how many of each call every worker in the phase makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseProfile {
    pub time_start: u32,
    pub time_end: u32,
    pub post_count: u32,
    pub get1_count: u32,
    pub get2_count: u32,
}

/// The three phase profiles of a run.
///
/// | Phase    | Minutes  | Writes | Day reads | Total reads |
/// |----------|----------|--------|-----------|-------------|
/// | startup  |   1–90   |  1000  |     5     |      0      |
/// | peak     |  91–360  |  1000  |     5     |      0      |
/// | cooldown | 361–420  |  1000  |    10     |     10      |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseProfiles {
    pub startup: PhaseProfile,
    pub peak: PhaseProfile,
    pub cooldown: PhaseProfile,
}

impl Default for PhaseProfiles {
    fn default() -> Self {
        Self {
            startup: PhaseProfile {
                time_start: 1,
                time_end: 90,
                post_count: 1000,
                get1_count: 5,
                get2_count: 0,
            },
            peak: PhaseProfile {
                time_start: 91,
                time_end: 360,
                post_count: 1000,
                get1_count: 5,
                get2_count: 0,
            },
            cooldown: PhaseProfile {
                time_start: 361,
                time_end: 420,
                post_count: 1000,
                get1_count: 10,
                get2_count: 10,
            },
        }
    }
}

impl PhaseProfile {
    /// Calls one worker of this phase makes.
    pub fn calls_per_worker(&self) -> u64 {
        u64::from(self.post_count) + u64::from(self.get1_count) + u64::from(self.get2_count)
    }
}

impl PhaseProfiles {
    pub fn as_array(&self) -> [PhaseProfile; 3] {
        [self.startup, self.peak, self.cooldown]
    }
}

/// One fully sized phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadPhase {
    /// 1-based position in the run.
    pub index: u32,
    pub profile: PhaseProfile,
    pub workers: u32,
    /// Completed workers needed before the next phase may start.
    pub latch_threshold: u32,
}

/// Worker counts and latch sizes for all three phases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhasePlan {
    pub phases: [LoadPhase; 3],
}

impl PhasePlan {
    pub fn new(max_threads: u32, profiles: &PhaseProfiles) -> Self {
        let [startup, peak, cooldown] = profiles.as_array();
        let edge_workers = max_threads / PHASE_DIVISOR;

        let phases = [
            LoadPhase {
                index: 1,
                profile: startup,
                workers: edge_workers,
                latch_threshold: tenth_rounded_up(edge_workers),
            },
            LoadPhase {
                index: 2,
                profile: peak,
                workers: max_threads,
                latch_threshold: tenth_rounded_up(max_threads),
            },
            // Nothing follows phase three, so the run goes straight to the global wait.
            LoadPhase {
                index: 3,
                profile: cooldown,
                workers: edge_workers,
                latch_threshold: 0,
            },
        ];
        Self { phases }
    }

    /// Size of the run-wide latch: every worker of every phase.
    pub fn total_workers(&self) -> u32 {
        self.phases.iter().map(|p| p.workers).sum()
    }

    /// Calls every worker of the plan will attempt.
    pub fn total_calls(&self) -> u64 {
        self.phases
            .iter()
            .map(|p| u64::from(p.workers) * p.profile.calls_per_worker())
            .sum()
    }
}

fn tenth_rounded_up(n: u32) -> u32 {
    n.div_ceil(10)
}

/// Inclusive slice of skier IDs owned by one worker.
///
/// When the population is too small for the worker count the slice size
/// truncates to zero and `last < first`; such a range is degenerate and every
/// pick returns `first`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkierRange {
    pub first: u32,
    pub last: u32,
}

impl SkierRange {
    /// Slice for worker `worker_index` of a phase. Slices are sized
    /// `num_skiers / max_threads / 4`, so they never overlap within a phase.
    pub fn for_worker(worker_index: u32, num_skiers: u32, max_threads: u32) -> Self {
        let size = slice_size(num_skiers, max_threads);
        Self {
            first: worker_index * size + 1,
            last: (worker_index + 1) * size,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.last < self.first
    }

    pub fn len(&self) -> u32 {
        if self.is_degenerate() { 0 } else { self.last - self.first + 1 }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pick(&self, rng: &mut impl Rng) -> u32 {
        if self.is_degenerate() {
            return self.first;
        }
        rng.gen_range(self.first..=self.last)
    }
}

fn slice_size(num_skiers: u32, max_threads: u32) -> u32 {
    if max_threads == 0 {
        return 0;
    }
    num_skiers / max_threads / PHASE_DIVISOR
}
