//! Delayed-action scheduling.
//!
//! Timed behaviors in the bridge (the debug toast demonstration, the
//! playground's deferred injection) are expressed as schedulable jobs
//! rather than blocking sleeps, so the surface's execution context is
//! never stalled and tests can drive time by hand.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

/// A deferred unit of work.
pub type ScheduledJob = Box<dyn FnOnce() + Send>;

/// Schedules a job to run after a delay.
///
/// Implementations must not block the caller.
pub trait Scheduler: Send + Sync {
    /// Run `job` once, after at least `delay` has elapsed.
    fn schedule(&self, delay: Duration, job: ScheduledJob);
}

/// Production scheduler: one short-lived thread per job.
///
/// Job volume here is a handful of diagnostics per page load, so a thread
/// per job is fine.
#[derive(Debug, Default)]
pub struct SpawnScheduler;

impl Scheduler for SpawnScheduler {
    fn schedule(&self, delay: Duration, job: ScheduledJob) {
        std::thread::spawn(move || {
            std::thread::sleep(delay);
            job();
        });
    }
}

/// Test scheduler that collects jobs and runs them on demand.
#[derive(Default)]
pub struct ManualScheduler {
    jobs: Mutex<Vec<(Duration, ScheduledJob)>>,
}

impl ManualScheduler {
    /// Create an empty manual scheduler.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of jobs waiting to run.
    pub fn pending(&self) -> usize {
        self.jobs.lock().len()
    }

    /// Run every pending job, in scheduling order.
    pub fn run_all(&self) {
        let jobs: Vec<_> = self.jobs.lock().drain(..).collect();
        for (_, job) in jobs {
            job();
        }
    }

    /// Run pending jobs whose delay is at most `elapsed`.
    pub fn run_due(&self, elapsed: Duration) {
        let mut held = self.jobs.lock();
        let mut due = Vec::new();
        let mut remaining = Vec::new();
        for (delay, job) in held.drain(..) {
            if delay <= elapsed {
                due.push(job);
            } else {
                remaining.push((delay, job));
            }
        }
        *held = remaining;
        drop(held);
        for job in due {
            job();
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, job: ScheduledJob) {
        self.jobs.lock().push((delay, job));
    }
}
