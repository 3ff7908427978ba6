//! Bounded job runner.
//!
//! Runs one asynchronous job per item while keeping at most `limit` jobs in
//! flight. A fixed pool of `min(limit, items)` workers pulls items from a
//! shared cursor. When a job settles, its worker frees the slot, bumps the
//! completed count and reports progress under the run lock, and only then
//! pulls the next item. The pool stays saturated instead of advancing in
//! lock-step batches.
//!
//! Worker futures are joined inside the `run` future rather than spawned, so
//! every job of a run is multiplexed onto the task that awaits `run`.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use engine_logging::{engine_debug, engine_trace};
use futures_util::future::join_all;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunnerError {
    #[error("concurrency limit must be at least 1")]
    ZeroLimit,
}

/// Aggregate progress after a job settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunProgress {
    pub completed: usize,
    pub total: usize,
}

impl RunProgress {
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        (self.completed.min(self.total) * 100 / self.total) as u8
    }

    pub fn is_done(&self) -> bool {
        self.completed == self.total
    }
}

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// Nothing scheduled yet.
    Idle,
    /// Items remain unscheduled.
    Draining,
    /// Everything is scheduled; some items have not settled.
    Finishing,
    /// Every item has settled.
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome<T, E> {
    Succeeded(T),
    Failed(E),
    /// Never started, or dropped mid-flight, because the run was cancelled.
    Cancelled,
}

impl<T, E> ItemOutcome<T, E> {
    pub fn is_success(&self) -> bool {
        matches!(self, ItemOutcome::Succeeded(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ItemOutcome::Failed(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ItemOutcome::Cancelled)
    }
}

/// Per-item outcomes of a run, in item order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport<T, E> {
    pub outcomes: Vec<ItemOutcome<T, E>>,
}

impl<T, E> RunReport<T, E> {
    fn empty() -> Self {
        Self {
            outcomes: Vec::new(),
        }
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }

    pub fn cancelled_items(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_cancelled()).count()
    }

    /// True when at least one item was cut short by cancellation.
    pub fn cancelled(&self) -> bool {
        self.cancelled_items() > 0
    }
}

/// Scheduling state of one run. Owned by the run, never shared across runs.
#[derive(Debug)]
struct QueueState<I> {
    pending: VecDeque<(usize, I)>,
    total: usize,
    cursor: usize,
    active: usize,
    completed: usize,
    limit: usize,
}

impl<I> QueueState<I> {
    fn new(items: Vec<I>, limit: usize) -> Self {
        let total = items.len();
        Self {
            pending: items.into_iter().enumerate().collect(),
            total,
            cursor: 0,
            active: 0,
            completed: 0,
            limit,
        }
    }

    /// Moves the cursor past the next item and marks its slot busy.
    fn schedule(&mut self) -> Option<(usize, I)> {
        if self.active >= self.limit {
            return None;
        }
        let next = self.pending.pop_front()?;
        self.cursor += 1;
        self.active += 1;
        debug_assert_eq!(next.0 + 1, self.cursor);
        Some(next)
    }

    /// Frees the slot of a settled job and counts it as completed.
    fn settle(&mut self) -> RunProgress {
        self.release();
        self.completed += 1;
        RunProgress {
            completed: self.completed,
            total: self.total,
        }
    }

    /// Frees the slot of a job dropped on cancellation; it does not count.
    fn abandon(&mut self) {
        self.release();
    }

    fn release(&mut self) {
        debug_assert!(self.active > 0);
        self.active = self.active.saturating_sub(1);
    }

    fn phase(&self) -> RunPhase {
        if self.completed == self.total {
            RunPhase::Done
        } else if self.cursor == 0 {
            RunPhase::Idle
        } else if self.cursor < self.total {
            RunPhase::Draining
        } else {
            RunPhase::Finishing
        }
    }
}

/// Everything the workers of one run touch between awaits.
struct RunState<I, T, E, P> {
    queue: QueueState<I>,
    outcomes: Vec<Option<ItemOutcome<T, E>>>,
    on_progress: P,
}

/// Executes per-item jobs with a fixed concurrency ceiling.
#[derive(Debug, Clone, Copy)]
pub struct BoundedRunner {
    limit: usize,
}

impl BoundedRunner {
    pub fn new(limit: usize) -> Result<Self, RunnerError> {
        if limit == 0 {
            return Err(RunnerError::ZeroLimit);
        }
        Ok(Self { limit })
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Runs `job` once for every item, at most `limit` at a time.
    ///
    /// `on_progress` fires once per settled job, successful or not, with a
    /// completed count that goes 1, 2, ... up to the number of items. It runs
    /// before the freed slot picks up another item. A failed job only shows
    /// up in the returned report; it never stops the run.
    ///
    /// Cancelling `cancel` stops scheduling, drops in-flight jobs and marks
    /// every unsettled item as [`ItemOutcome::Cancelled`].
    pub async fn run<I, T, E, F, Fut, P>(
        &self,
        items: Vec<I>,
        job: F,
        on_progress: P,
        cancel: &CancellationToken,
    ) -> RunReport<T, E>
    where
        F: Fn(I) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: FnMut(RunProgress),
    {
        let total = items.len();
        if total == 0 {
            return RunReport::empty();
        }

        let workers = self.limit.min(total);
        engine_debug!("run starting: items={} workers={}", total, workers);

        let shared = Mutex::new(RunState {
            queue: QueueState::new(items, self.limit),
            outcomes: (0..total).map(|_| None).collect(),
            on_progress,
        });

        join_all((0..workers).map(|slot| worker(slot, &shared, &job, cancel))).await;

        let RunState { queue, outcomes, .. } =
            shared.into_inner().unwrap_or_else(PoisonError::into_inner);
        engine_debug!(
            "run finished: completed={}/{} phase={:?} cancelled={}",
            queue.completed,
            total,
            queue.phase(),
            cancel.is_cancelled()
        );

        RunReport {
            outcomes: outcomes
                .into_iter()
                .map(|outcome| outcome.unwrap_or(ItemOutcome::Cancelled))
                .collect(),
        }
    }
}

async fn worker<I, T, E, F, Fut, P>(
    slot: usize,
    shared: &Mutex<RunState<I, T, E, P>>,
    job: &F,
    cancel: &CancellationToken,
) where
    F: Fn(I) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: FnMut(RunProgress),
{
    loop {
        if cancel.is_cancelled() {
            break;
        }
        let Some((index, item)) = lock(shared).queue.schedule() else {
            break;
        };
        engine_trace!("worker {} started item {}", slot, index);

        let settled = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = job(item) => Some(result),
        };

        let mut run = lock(shared);
        let Some(result) = settled else {
            run.queue.abandon();
            engine_trace!("worker {} dropped item {} on cancel", slot, index);
            break;
        };
        let progress = run.queue.settle();
        run.outcomes[index] = Some(match result {
            Ok(value) => ItemOutcome::Succeeded(value),
            Err(err) => ItemOutcome::Failed(err),
        });
        (run.on_progress)(progress);
        engine_trace!(
            "worker {} settled item {} ({:?})",
            slot,
            index,
            run.queue.phase()
        );
        drop(run);
    }
}

fn lock<T>(state: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking progress callback poisons the lock; the counters are still sound.
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
