//! The scheduler: job ownership, recurrence, and persistence
//!
//! The [`Scheduler`] owns the authoritative price snapshot and the live job
//! collection. Recurring rerolls are modeled as chains of one-shot jobs
//! driven by an explicit continuation loop, and both jobs and prices are
//! persisted as JSON files so schedules survive restarts.

use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::error::{SchedulerError, SchedulerResult};
use super::job::{Job, JobCallback, JobKind, JobOutcome, JobState};
use crate::catalog::{CatalogResult, CatalogSource};
use crate::error::Result;
use crate::models::PriceConglomerate;
use crate::notify::{PriceNotifier, StoreUpdate, UpdateReason};
use crate::pricing::{reroll_prices, sample_catalog};

// ============================================================================
// Scheduler Configuration
// ============================================================================

/// Configuration for the scheduler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Daily item reroll time (24h format, e.g. "23:00", local clock)
    #[serde(default = "default_reroll_time")]
    pub reroll_time: String,

    /// Seconds between recurring price updates
    #[serde(default = "default_price_interval")]
    pub price_interval_secs: u64,

    /// Delay applied to restored jobs whose due date already passed
    #[serde(default = "default_catchup_delay")]
    pub catchup_delay_secs: u64,

    /// Where the job list is persisted
    #[serde(default = "default_jobs_path")]
    pub jobs_path: PathBuf,

    /// Where the price snapshot is persisted
    #[serde(default = "default_prices_path")]
    pub prices_path: PathBuf,
}

fn default_reroll_time() -> String {
    "23:00".to_string()
}

fn default_price_interval() -> u64 {
    300
}

fn default_catchup_delay() -> u64 {
    30
}

fn default_jobs_path() -> PathBuf {
    PathBuf::from("data/jobs.json")
}

fn default_prices_path() -> PathBuf {
    PathBuf::from("data/prices.json")
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            reroll_time: default_reroll_time(),
            price_interval_secs: default_price_interval(),
            catchup_delay_secs: default_catchup_delay(),
            jobs_path: default_jobs_path(),
            prices_path: default_prices_path(),
        }
    }
}

impl SchedulerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> SchedulerResult<()> {
        self.parse_reroll_time()?;

        if self.price_interval_secs == 0 {
            return Err(SchedulerError::config_error(
                "price_interval_secs",
                "must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Parse the daily reroll time
    pub fn parse_reroll_time(&self) -> SchedulerResult<NaiveTime> {
        NaiveTime::parse_from_str(&self.reroll_time, "%H:%M")
            .map_err(|_| SchedulerError::invalid_reroll_time(self.reroll_time.clone()))
    }
}

// ============================================================================
// Job Records
// ============================================================================

/// Persisted form of a pending job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    /// When the job is due
    pub date: DateTime<Utc>,

    /// What the job does
    pub kind: JobKind,
}

/// Next occurrence of a daily wall-clock time, strictly in the future.
///
/// Rolls forward by whole days (local clock) until the target passes now.
pub fn next_occurrence(time: NaiveTime) -> DateTime<Utc> {
    let now = Local::now();
    let mut date = now.date_naive();
    loop {
        if let Some(target) = Local.from_local_datetime(&date.and_time(time)).earliest() {
            if target > now {
                return target.with_timezone(&Utc);
            }
        }
        date += Duration::days(1);
    }
}

// ============================================================================
// Shared State
// ============================================================================

/// State shared between the scheduler and its spawned chain loops
#[derive(Clone)]
struct SharedState {
    jobs: Arc<RwLock<Vec<Arc<Job>>>>,
    prices: Arc<RwLock<Option<Arc<PriceConglomerate>>>>,
    catalog: Arc<dyn CatalogSource>,
    notifier: Arc<dyn PriceNotifier>,
    reroll_time: NaiveTime,
    price_interval: Duration,
    catchup_delay: Duration,
}

impl SharedState {
    /// Build the callback a reroll job runs when it fires
    fn reroll_callback(&self, kind: JobKind) -> JobCallback {
        let state = self.clone();
        Box::new(move || {
            let state = state.clone();
            Box::pin(async move { state.run_reroll(kind).await })
        })
    }

    /// Execute one reroll: compute the new snapshot, swap it in, notify
    async fn run_reroll(&self, kind: JobKind) {
        let new_prices = match kind {
            JobKind::ItemReroll => match self.sample_fresh().await {
                Ok(prices) => prices,
                Err(e) => {
                    tracing::error!(error = %e, "item reroll failed, keeping previous stock");
                    return;
                }
            },
            JobKind::Price => {
                let current = self.prices.read().await.clone();
                match current {
                    Some(prices) => {
                        let rotated = {
                            let mut rng = rand::thread_rng();
                            reroll_prices(&prices, &mut rng)
                        };
                        Arc::new(rotated)
                    }
                    None => {
                        tracing::warn!(
                            "price reroll requested with no snapshot, sampling catalog instead"
                        );
                        match self.sample_fresh().await {
                            Ok(prices) => prices,
                            Err(e) => {
                                tracing::error!(error = %e, "fallback catalog sample failed");
                                return;
                            }
                        }
                    }
                }
            }
        };

        // wholesale replacement: readers holding the old Arc keep a
        // consistent snapshot
        *self.prices.write().await = Some(Arc::clone(&new_prices));
        tracing::info!(kind = %kind, items = new_prices.item_count(), "price snapshot replaced");

        let update = StoreUpdate {
            prices: (*new_prices).clone(),
            reason: match kind {
                JobKind::Price => UpdateReason::PriceReroll,
                JobKind::ItemReroll => UpdateReason::ItemReroll,
            },
            next_update: Some(self.next_due_for(kind)),
            updated_at: Utc::now(),
        };
        if let Err(e) = self.notifier.publish(&update).await {
            tracing::warn!(notifier = self.notifier.name(), error = %e, "price update notification failed");
        }
    }

    /// Fetch the catalog and sample a fresh stocked set
    async fn sample_fresh(&self) -> CatalogResult<Arc<PriceConglomerate>> {
        let entries = self.catalog.fetch().await?;
        let prices = {
            let mut rng = rand::thread_rng();
            sample_catalog(&entries, self.catalog.tiering(), &mut rng)
        };
        if !prices.has_unique_names() {
            tracing::warn!("sampled stock contains a name in more than one tier");
        }
        Ok(Arc::new(prices))
    }

    /// When the occurrence after the current one is due
    fn next_due_for(&self, kind: JobKind) -> DateTime<Utc> {
        match kind {
            JobKind::ItemReroll => next_occurrence(self.reroll_time),
            JobKind::Price => Utc::now() + self.price_interval,
        }
    }

    /// Create, arm, and register a reroll job; prunes finished jobs
    async fn insert_job(&self, due: DateTime<Utc>, kind: JobKind) -> SchedulerResult<Arc<Job>> {
        let job = Job::schedule(due, kind, self.reroll_callback(kind)).await?;

        let mut jobs = self.jobs.write().await;
        let mut kept = Vec::with_capacity(jobs.len() + 1);
        for existing in jobs.drain(..) {
            if existing.state().await != JobState::Stopped {
                kept.push(existing);
            }
        }
        kept.push(Arc::clone(&job));
        *jobs = kept;

        Ok(job)
    }

    /// Start a recurring chain: insert the first job now, then spawn the
    /// continuation loop
    async fn start_chain(&self, kind: JobKind, first_due: DateTime<Utc>) -> SchedulerResult<Arc<Job>> {
        let first = self.insert_job(first_due, kind).await?;
        let state = self.clone();
        tokio::spawn(state.continue_chain(kind, Arc::clone(&first)));
        Ok(first)
    }

    /// Recurrence as an explicit loop: every completed occurrence inserts
    /// its successor; a cancelled one ends the chain.
    async fn continue_chain(self, kind: JobKind, mut current: Arc<Job>) {
        while current.wait().await == JobOutcome::Completed {
            let due = self.next_due_for(kind);
            match self.insert_job(due, kind).await {
                Ok(next) => {
                    tracing::debug!(kind = %kind, due = %due, "next occurrence scheduled");
                    current = next;
                }
                Err(e) => {
                    tracing::error!(kind = %kind, error = %e, "failed to schedule next occurrence");
                    break;
                }
            }
        }
        tracing::debug!(kind = %kind, "recurring chain ended");
    }
}

// ============================================================================
// Scheduler
// ============================================================================

/// Owner of the live job collection and the current price snapshot
pub struct Scheduler {
    state: SharedState,
    config: SchedulerConfig,
}

impl Scheduler {
    /// Create a scheduler over a catalog source and a notifier
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        notifier: Arc<dyn PriceNotifier>,
        config: SchedulerConfig,
    ) -> SchedulerResult<Self> {
        config.validate()?;
        let reroll_time = config.parse_reroll_time()?;

        Ok(Self {
            state: SharedState {
                jobs: Arc::new(RwLock::new(Vec::new())),
                prices: Arc::new(RwLock::new(None)),
                catalog,
                notifier,
                reroll_time,
                price_interval: Duration::seconds(config.price_interval_secs as i64),
                catchup_delay: Duration::seconds(config.catchup_delay_secs as i64),
            },
            config,
        })
    }

    /// The active configuration
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Current price snapshot, if one exists
    pub async fn prices(&self) -> Option<Arc<PriceConglomerate>> {
        self.state.prices.read().await.clone()
    }

    /// Snapshot of the live job collection
    pub async fn jobs(&self) -> Vec<Arc<Job>> {
        self.state.jobs.read().await.clone()
    }

    /// Earliest due date among waiting jobs of a kind
    pub async fn next_due(&self, kind: JobKind) -> Option<DateTime<Utc>> {
        let jobs = self.jobs().await;
        let mut next: Option<DateTime<Utc>> = None;
        for job in jobs {
            if job.kind() == kind && job.state().await == JobState::Waiting {
                next = Some(next.map_or(job.due(), |d| d.min(job.due())));
            }
        }
        next
    }

    /// Register a one-shot job with a caller-supplied callback
    pub async fn add_job(
        &self,
        due: DateTime<Utc>,
        kind: JobKind,
        callback: JobCallback,
    ) -> SchedulerResult<Arc<Job>> {
        let job = Job::schedule(due, kind, callback).await?;
        self.state.jobs.write().await.push(Arc::clone(&job));
        Ok(job)
    }

    /// Schedule the recurring daily item reroll chain.
    ///
    /// Returns the first occurrence, computed by rolling the configured
    /// wall-clock time forward until it is in the future.
    pub async fn schedule_recurring_item_reroll(&self) -> SchedulerResult<DateTime<Utc>> {
        let due = next_occurrence(self.state.reroll_time);
        tracing::info!(due = %due, "scheduling recurring item reroll");
        self.state.start_chain(JobKind::ItemReroll, due).await?;
        Ok(due)
    }

    /// Schedule the recurring price update chain
    pub async fn schedule_recurring_price_update(&self) -> SchedulerResult<DateTime<Utc>> {
        let due = Utc::now() + self.state.price_interval;
        tracing::info!(due = %due, "scheduling recurring price update");
        self.state.start_chain(JobKind::Price, due).await?;
        Ok(due)
    }

    /// Shutdown sweep over the job collection.
    ///
    /// Drops stopped and paused jobs, pauses every waiting job, and keeps
    /// running jobs so they finish on their own. Never blocks on in-flight
    /// work; call this after persisting state.
    pub async fn stop_all_jobs(&self) {
        tracing::info!("stopping all jobs");
        eprintln!("DBG stop_all: acquiring jobs write");
        let mut jobs = self.state.jobs.write().await;
        eprintln!("DBG stop_all: got jobs write, len={}", jobs.len());

        let mut keep = Vec::new();
        let mut to_pause = Vec::new();
        for job in jobs.drain(..) {
            eprintln!("DBG stop_all: reading job state");
            match job.state().await {
                JobState::Stopped | JobState::Paused => {}
                JobState::Running => keep.push(job),
                JobState::Waiting => to_pause.push(job),
            }
        }

        eprintln!("DBG stop_all: to_pause={}", to_pause.len());
        let results = futures::future::join_all(to_pause.iter().map(|job| job.pause())).await;
        eprintln!("DBG stop_all: pause done");
        for (job, result) in to_pause.iter().zip(results) {
            match result {
                Ok(()) => {}
                Err(SchedulerError::JobIsRunning) => {
                    // fired between observation and pause; let it finish
                    tracing::warn!(job_id = %job.id(), "job fired during shutdown sweep");
                    keep.push(Arc::clone(job));
                }
                Err(e) => {
                    tracing::debug!(job_id = %job.id(), error = %e, "job finished before pause");
                }
            }
        }

        *jobs = keep;
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Write the current price snapshot as pretty JSON (full overwrite)
    pub async fn save_prices_to_file(&self, path: impl AsRef<Path>) -> SchedulerResult<()> {
        let Some(prices) = self.state.prices.read().await.clone() else {
            tracing::warn!("no price snapshot to save");
            return Ok(());
        };

        let json = prices.to_json()?;
        tokio::fs::write(path.as_ref(), json)
            .await
            .map_err(|e| SchedulerError::io_error("save_prices", e.to_string()))?;
        tracing::info!(path = %path.as_ref().display(), "prices saved");
        Ok(())
    }

    /// Restore the price snapshot; a missing or corrupt file falls back to
    /// sampling the live catalog.
    pub async fn load_prices_from_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let loaded = match tokio::fs::read_to_string(path.as_ref()).await {
            Ok(data) => match PriceConglomerate::from_json(&data) {
                Ok(prices) => Some(prices),
                Err(e) => {
                    tracing::warn!(path = %path.as_ref().display(), error = %e, "prices file corrupt, sampling catalog");
                    None
                }
            },
            Err(_) => {
                tracing::warn!(path = %path.as_ref().display(), "no prices file found, sampling catalog");
                None
            }
        };

        let prices = match loaded {
            Some(prices) => Arc::new(prices),
            None => self.state.sample_fresh().await?,
        };

        tracing::info!(items = prices.item_count(), "prices loaded");
        *self.state.prices.write().await = Some(prices);
        Ok(())
    }

    /// Write records for every job not in the stopped state
    pub async fn save_jobs_to_file(&self, path: impl AsRef<Path>) -> SchedulerResult<()> {
        let jobs = self.jobs().await;
        let mut records = Vec::with_capacity(jobs.len());
        for job in jobs {
            if job.state().await != JobState::Stopped {
                records.push(JobRecord {
                    date: job.due(),
                    kind: job.kind(),
                });
            }
        }

        let json = serde_json::to_string_pretty(&records)?;
        tokio::fs::write(path.as_ref(), json)
            .await
            .map_err(|e| SchedulerError::io_error("save_jobs", e.to_string()))?;
        tracing::info!(path = %path.as_ref().display(), count = records.len(), "jobs saved");
        Ok(())
    }

    /// Restore jobs from records, resuming their recurring chains.
    ///
    /// Prices must be loaded first. A record whose date already passed is
    /// rescheduled a short, fixed delay into the future instead of firing
    /// a backlog at startup. A missing or corrupt file bootstraps a fresh
    /// recurring item reroll and persists it immediately.
    pub async fn load_jobs_from_file(&self, path: impl AsRef<Path>) -> Result<()> {
        if self.state.prices.read().await.is_none() {
            return Err(SchedulerError::PricesNotLoaded.into());
        }

        let records = match tokio::fs::read_to_string(path.as_ref()).await {
            Ok(data) => match serde_json::from_str::<Vec<JobRecord>>(&data) {
                Ok(records) => Some(records),
                Err(e) => {
                    tracing::warn!(path = %path.as_ref().display(), error = %e, "jobs file corrupt");
                    None
                }
            },
            Err(_) => {
                tracing::warn!(path = %path.as_ref().display(), "no jobs file found, creating");
                None
            }
        };

        let Some(records) = records else {
            self.schedule_recurring_item_reroll().await?;
            self.save_jobs_to_file(path).await?;
            return Ok(());
        };

        for record in records {
            let now = Utc::now();
            let due = if record.date <= now {
                let substituted = now + self.state.catchup_delay;
                tracing::info!(
                    kind = %record.kind,
                    original = %record.date,
                    substituted = %substituted,
                    "job date is in the past, rescheduling shortly"
                );
                substituted
            } else {
                record.date
            };

            self.state.start_chain(record.kind, due).await?;
        }

        Ok(())
    }

    /// Persist jobs then prices
    pub async fn save_all(
        &self,
        jobs_path: impl AsRef<Path>,
        prices_path: impl AsRef<Path>,
    ) -> SchedulerResult<()> {
        self.save_jobs_to_file(jobs_path).await?;
        self.save_prices_to_file(prices_path).await?;
        Ok(())
    }

    /// Restore prices, then jobs (whose callbacks assume a snapshot exists)
    pub async fn load_all(
        &self,
        jobs_path: impl AsRef<Path>,
        prices_path: impl AsRef<Path>,
    ) -> Result<()> {
        self.load_prices_from_file(prices_path).await?;
        self.load_jobs_from_file(jobs_path).await?;
        Ok(())
    }

    /// Snapshot of scheduler health for logging
    pub async fn status(&self) -> SchedulerStatus {
        let jobs = self.jobs().await;
        let mut waiting = 0;
        let mut running = 0;
        let mut paused = 0;
        for job in &jobs {
            match job.state().await {
                JobState::Waiting => waiting += 1,
                JobState::Running => running += 1,
                JobState::Paused => paused += 1,
                JobState::Stopped => {}
            }
        }

        SchedulerStatus {
            job_count: jobs.len(),
            waiting,
            running,
            paused,
            item_count: self.prices().await.map(|p| p.item_count()),
            next_item_reroll: self.next_due(JobKind::ItemReroll).await,
            next_price_update: self.next_due(JobKind::Price).await,
        }
    }
}

/// Scheduler status information
#[derive(Debug, Clone)]
pub struct SchedulerStatus {
    pub job_count: usize,
    pub waiting: usize,
    pub running: usize,
    pub paused: usize,
    pub item_count: Option<usize>,
    pub next_item_reroll: Option<DateTime<Utc>>,
    pub next_price_update: Option<DateTime<Utc>>,
}

impl SchedulerStatus {
    /// Format as display string
    pub fn display(&self) -> String {
        let mut output = String::from("Scheduler Status\n");
        output.push_str(&format!("{:-<40}\n", ""));
        output.push_str(&format!(
            "Jobs: {} ({} waiting, {} running, {} paused)\n",
            self.job_count, self.waiting, self.running, self.paused
        ));
        match self.item_count {
            Some(count) => output.push_str(&format!("Stocked Items: {count}\n")),
            None => output.push_str("Stocked Items: none\n"),
        }
        if let Some(due) = self.next_item_reroll {
            output.push_str(&format!("Next Item Reroll: {due}\n"));
        }
        if let Some(due) = self.next_price_update {
            output.push_str(&format!("Next Price Update: {due}\n"));
        }
        output
    }
}
