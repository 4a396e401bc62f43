//! Timer-backed one-shot job
//!
//! A [`Job`] fires a single callback at (or after) a target wall-clock
//! time, exactly once. Recurring behavior is built by constructing a fresh
//! job per occurrence, never by restarting one; see the engine's chain
//! loops.
//!
//! State machine: `stopped` → `waiting` (timer armed) → `running`
//! (callback executing) → `stopped`. `paused` is reachable only from
//! `waiting`; a paused job keeps its due date and can be re-armed with
//! [`Job::start`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::error::{SchedulerError, SchedulerResult};

/// Work a job runs when its timer elapses
pub type JobCallback = Box<dyn Fn() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// What a job does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobKind {
    /// Reroll current prices, keep the stocked set
    Price,
    /// Resample the stocked set from the catalog
    ItemReroll,
}

impl JobKind {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::ItemReroll => "item-reroll",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle state of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// No armed timer; initial and terminal state
    Stopped,
    /// Timer armed, callback not yet due
    Waiting,
    /// Callback executing
    Running,
    /// Timer cancelled but the job kept for a later restart
    Paused,
}

/// How a job's lifetime ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// The callback ran to completion
    Completed,
    /// The timer was cancelled (stop or pause) before firing
    Cancelled,
}

/// A single schedulable unit of work bound to a future point in time.
///
/// The timer resource is exclusively owned: the handle slot is filled once
/// by [`start`](Self::start) and emptied exactly once, either by
/// cancellation or by natural firing.
pub struct Job {
    id: Uuid,
    kind: JobKind,
    due: DateTime<Utc>,
    state: Arc<RwLock<JobState>>,
    timer: Arc<Mutex<Option<JoinHandle<()>>>>,
    outcome: watch::Sender<Option<JobOutcome>>,
}

impl Job {
    /// Create an unarmed job for a target date
    pub fn new(due: DateTime<Utc>, kind: JobKind) -> Self {
        let (outcome, _) = watch::channel(None);
        Self {
            id: Uuid::new_v4(),
            kind,
            due,
            state: Arc::new(RwLock::new(JobState::Stopped)),
            timer: Arc::new(Mutex::new(None)),
            outcome,
        }
    }

    /// Construct and arm a job in one step
    pub async fn schedule(
        due: DateTime<Utc>,
        kind: JobKind,
        callback: JobCallback,
    ) -> SchedulerResult<Arc<Self>> {
        let job = Arc::new(Self::new(due, kind));
        job.start(callback).await?;
        Ok(job)
    }

    /// Unique id for log correlation
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// What this job does when due
    pub fn kind(&self) -> JobKind {
        self.kind
    }

    /// Target wall-clock time
    pub fn due(&self) -> DateTime<Utc> {
        self.due
    }

    /// Current lifecycle state
    pub async fn state(&self) -> JobState {
        eprintln!("DBG Job::state: requesting read lock");
        let g = self.state.read().await;
        eprintln!("DBG Job::state: got read lock");
        *g
    }

    /// Arm the timer. A due date in the past fires immediately.
    ///
    /// Fails with [`SchedulerError::JobAlreadyRunning`] if a timer is
    /// already armed; timers are not re-entrant.
    pub async fn start(&self, callback: JobCallback) -> SchedulerResult<()> {
        let mut timer = self.timer.lock().await;
        if timer.is_some() {
            return Err(SchedulerError::JobAlreadyRunning);
        }

        self.outcome.send_replace(None);
        *self.state.write().await = JobState::Waiting;

        let delay = (self.due - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        let state = Arc::clone(&self.state);
        let slot = Arc::clone(&self.timer);
        let outcome = self.outcome.clone();
        let id = self.id;
        let kind = self.kind;

        tracing::debug!(job_id = %id, kind = %kind, due = %self.due, delay_ms = delay.as_millis() as u64, "job armed");

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            // Serialize the waiting->running transition against stop/pause:
            // once we hold the slot, a sweep can no longer abort us.
            {
                let _slot = slot.lock().await;
                *state.write().await = JobState::Running;
            }
            tracing::debug!(job_id = %id, kind = %kind, "job firing");

            callback().await;

            *state.write().await = JobState::Stopped;
            slot.lock().await.take();
            outcome.send_replace(Some(JobOutcome::Completed));
            tracing::debug!(job_id = %id, kind = %kind, "job finished");
        });

        *timer = Some(handle);
        Ok(())
    }

    /// Cancel a waiting job, or wait out a running one.
    ///
    /// Fails with [`SchedulerError::JobNotArmed`] if no timer is armed and
    /// nothing is running.
    pub async fn stop(&self) -> SchedulerResult<()> {
        let mut timer = self.timer.lock().await;
        if timer.is_none() {
            return Err(SchedulerError::JobNotArmed);
        }

        match *self.state.read().await {
            JobState::Waiting => {
                if let Some(handle) = timer.take() {
                    handle.abort();
                }
                *self.state.write().await = JobState::Stopped;
                self.outcome.send_replace(Some(JobOutcome::Cancelled));
                tracing::debug!(job_id = %self.id, kind = %self.kind, "job stopped before firing");
                Ok(())
            }
            JobState::Running => {
                // Release the slot so the firing task can clear it, then
                // wait for the in-flight callback to finish on its own.
                drop(timer);
                self.wait().await;
                Ok(())
            }
            JobState::Stopped | JobState::Paused => Err(SchedulerError::JobNotArmed),
        }
    }

    /// Cancel a waiting job but keep it for a later restart.
    ///
    /// Never waits: a running callback cannot be paused and yields
    /// [`SchedulerError::JobIsRunning`].
    pub async fn pause(&self) -> SchedulerResult<()> {
        eprintln!("DBG pause: requesting timer lock");
        let mut timer = self.timer.lock().await;
        eprintln!("DBG pause: got timer lock");
        if timer.is_none() {
            return Err(SchedulerError::JobNotArmed);
        }

        match *self.state.read().await {
            JobState::Waiting => {
                if let Some(handle) = timer.take() {
                    handle.abort();
                }
                eprintln!("DBG pause: acquiring state write");
                *self.state.write().await = JobState::Paused;
                eprintln!("DBG pause: got state write");
                self.outcome.send_replace(Some(JobOutcome::Cancelled));
                tracing::debug!(job_id = %self.id, kind = %self.kind, "job paused");
                Ok(())
            }
            JobState::Running => Err(SchedulerError::JobIsRunning),
            JobState::Stopped | JobState::Paused => Err(SchedulerError::JobNotArmed),
        }
    }

    /// Await the job's outcome (callback completion or cancellation)
    pub async fn wait(&self) -> JobOutcome {
        let mut rx = self.outcome.subscribe();
        let result = match rx.wait_for(|outcome| outcome.is_some()).await {
            Ok(outcome) => (*outcome).unwrap_or(JobOutcome::Cancelled),
            // The sender lives inside the job, so this is unreachable while
            // the caller holds a reference; treat it as cancellation.
            Err(_) => JobOutcome::Cancelled,
        };
        result
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("due", &self.due)
            .finish()
    }
}
