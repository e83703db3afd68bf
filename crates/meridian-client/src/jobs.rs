//! Remote-job polling: interval schedule and the await-completion loop.
//!
//! States observed remotely: `Submitted → Running → {Completed | Failed}`.
//! `Running` carries sub-task counts, which are observational only and
//! never affect transitions.

use meridian_abstraction::{ApiError, JobHandle, JobProgress, JobState, JobStatusSource, Result};
use std::time::{Duration, Instant};
use tracing::debug;

/// Number of polls at the initial interval before the delay starts growing.
const WARMUP_POLLS: u32 = 4;

/// Default initial poll interval.
const DEFAULT_INITIAL: Duration = Duration::from_secs(1);
/// Default cap on the poll interval.
const DEFAULT_CAP: Duration = Duration::from_secs(20);

/// A monotonically non-decreasing, capped sequence of poll intervals.
///
/// The sequence holds the initial interval for a few polls (so short-lived
/// jobs stay responsive), then grows along the Fibonacci sequence up to the
/// cap, bounding request rate against the remote service: with 1s/20s
/// defaults the delays run 1,1,1,1,2,3,5,8,13,20,20,…
#[derive(Debug, Clone)]
pub struct PollSchedule {
    initial: Duration,
    cap: Duration,
    emitted: u32,
    prev: Duration,
    curr: Duration,
}

impl PollSchedule {
    /// Creates a schedule growing from `initial` up to `cap`.
    ///
    /// `cap` below `initial` is treated as `initial`.
    #[must_use]
    pub fn new(initial: Duration, cap: Duration) -> Self {
        let cap = cap.max(initial);
        Self { initial, cap, emitted: 0, prev: initial, curr: initial * 2 }
    }

    /// Returns the next poll delay, advancing the schedule.
    pub fn next_delay(&mut self) -> Duration {
        self.emitted += 1;
        if self.emitted <= WARMUP_POLLS {
            return self.initial.min(self.cap);
        }
        let delay = self.curr.min(self.cap);
        // Stop advancing once the cap is reached so the terms cannot
        // overflow on long-running awaits.
        if self.curr < self.cap {
            let next = self.prev.saturating_add(self.curr);
            self.prev = self.curr;
            self.curr = next;
        }
        delay
    }
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL, DEFAULT_CAP)
    }
}

impl Iterator for PollSchedule {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        Some(self.next_delay())
    }
}

/// Polls a job until it reaches a terminal state.
///
/// One tracker tracks one await at a time; independent jobs can be awaited
/// concurrently by separate trackers sharing the same status source.
#[derive(Debug, Clone, Default)]
pub struct JobTracker {
    schedule: PollSchedule,
}

impl JobTracker {
    /// Creates a tracker with the default poll schedule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tracker with a custom poll schedule.
    #[must_use]
    pub fn with_schedule(schedule: PollSchedule) -> Self {
        Self { schedule }
    }

    /// Awaits a terminal state for `job`, sleeping between polls.
    ///
    /// The first poll is issued immediately, so a job that is already
    /// terminal returns without sleeping. Every `Running` poll invokes
    /// `on_progress` with the sub-task counts and the elapsed time.
    ///
    /// If the deadline cannot be met by the next poll, the await fails
    /// with [`ApiError::AwaitTimeout`]. The remote job is left running —
    /// no cancellation is issued — and the same handle may be awaited
    /// again. Dropping the returned future likewise stops local polling
    /// only; it never cancels the remote job.
    ///
    /// # Errors
    /// [`ApiError::JobFailed`] when the job reaches the failed state,
    /// [`ApiError::AwaitTimeout`] when `max_wait` elapses first, or any
    /// error surfaced by the status source.
    pub async fn await_completion<S: JobStatusSource + ?Sized>(
        &self,
        source: &S,
        job: &JobHandle,
        max_wait: Duration,
        mut on_progress: Option<&mut (dyn FnMut(JobProgress) + Send + '_)>,
    ) -> Result<()> {
        let started = Instant::now();
        let mut schedule = self.schedule.clone();

        loop {
            match source.job_state(job).await? {
                JobState::Completed => {
                    debug!(job_id = %job.id, elapsed = ?started.elapsed(), "Job completed");
                    return Ok(());
                }
                JobState::Failed { message } => {
                    return Err(ApiError::JobFailed { job_id: job.id.clone(), message });
                }
                JobState::Submitted => {
                    debug!(job_id = %job.id, "Job submitted, not yet running");
                }
                JobState::Running { in_progress, queued } => {
                    debug!(
                        job_id = %job.id,
                        in_progress,
                        queued,
                        elapsed = ?started.elapsed(),
                        "Job running"
                    );
                    if let Some(callback) = on_progress.as_deref_mut() {
                        callback(JobProgress { in_progress, queued, elapsed: started.elapsed() });
                    }
                }
            }

            let delay = schedule.next_delay();
            let elapsed = started.elapsed();
            if elapsed + delay > max_wait {
                return Err(ApiError::AwaitTimeout { job_id: job.id.clone(), waited: elapsed });
            }
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_follows_fibonacci_cadence() {
        let mut schedule = PollSchedule::default();
        let secs: Vec<u64> = (0..11).map(|_| schedule.next_delay().as_secs()).collect();
        assert_eq!(secs, vec![1, 1, 1, 1, 2, 3, 5, 8, 13, 20, 20]);
    }

    #[test]
    fn test_schedule_is_non_decreasing_and_capped() {
        let cap = Duration::from_secs(20);
        let mut schedule = PollSchedule::new(Duration::from_secs(1), cap);
        let mut last = Duration::ZERO;
        for _ in 0..1_000 {
            let delay = schedule.next_delay();
            assert!(delay >= last, "schedule decreased: {:?} after {:?}", delay, last);
            assert!(delay <= cap, "schedule exceeded cap: {:?}", delay);
            last = delay;
        }
        assert_eq!(last, cap);
    }

    #[test]
    fn test_schedule_cap_below_initial_is_clamped() {
        let mut schedule =
            PollSchedule::new(Duration::from_secs(5), Duration::from_secs(1));
        for _ in 0..10 {
            assert_eq!(schedule.next_delay(), Duration::from_secs(5));
        }
    }

    #[test]
    fn test_schedule_iterator_never_ends() {
        let schedule = PollSchedule::default();
        assert_eq!(schedule.take(50).count(), 50);
    }
}
