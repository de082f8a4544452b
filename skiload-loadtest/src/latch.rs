use tokio::sync::watch;

/// A one-shot countdown barrier.
///
/// `wait` returns once `count_down` has been called `count` times. Extra
/// count-downs are absorbed, so a latch sized below the number of signallers
/// opens as soon as the first `count` of them arrive. A latch sized zero is
/// open from the start.
#[derive(Debug, Clone)]
pub struct CountdownLatch {
    remaining: watch::Sender<usize>,
}

impl CountdownLatch {
    pub fn new(count: usize) -> Self {
        let (remaining, _) = watch::channel(count);
        Self { remaining }
    }

    pub fn count_down(&self) {
        self.remaining.send_modify(|n| *n = n.saturating_sub(1));
    }

    pub fn remaining(&self) -> usize {
        *self.remaining.borrow()
    }

    pub async fn wait(&self) {
        let mut rx = self.remaining.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|n| *n == 0).await;
    }
}

/// Counts down a worker's phase latch and the run-wide latch when dropped.
///
/// Tying the signal to drop means it fires exactly once per worker, including
/// when the worker's task unwinds.
pub struct CompletionGuard {
    phase: CountdownLatch,
    global: CountdownLatch,
}

impl CompletionGuard {
    pub fn new(phase: CountdownLatch, global: CountdownLatch) -> Self {
        Self { phase, global }
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.phase.count_down();
        self.global.count_down();
    }
}
