//! Price-rotation scheduling
//!
//! This module provides the temporal core of the store: timer-backed jobs
//! and the scheduler that owns them.
//!
//! # Overview
//!
//! A [`Job`] is a single schedulable unit of work bound to a future point
//! in time. It owns one timer, fires its callback at most once, and moves
//! through a small state machine (`stopped` → `waiting` → `running` →
//! `stopped`, with `paused` reachable from `waiting`). Recurring behavior
//! is never built by restarting a job; the [`Scheduler`] runs chains of
//! one-shot jobs where each completed occurrence schedules its successor.
//!
//! The scheduler also owns the current [`PriceConglomerate`] snapshot,
//! replacing it wholesale on every reroll, and persists both the job list
//! and the snapshot as JSON files so a restart resumes where the process
//! left off. Records whose due date already passed are pushed a short,
//! fixed delay into the future instead of firing a backlog at startup.
//!
//! # Modules
//!
//! - [`job`] - The one-shot timer job and its state machine
//! - [`engine`] - The scheduler, recurrence chains, and persistence
//! - [`error`] - Scheduler error types
//!
//! [`PriceConglomerate`]: crate::models::PriceConglomerate

pub mod engine;
pub mod error;
pub mod job;

// Re-export main types
pub use engine::{next_occurrence, JobRecord, Scheduler, SchedulerConfig, SchedulerStatus};
pub use error::{SchedulerError, SchedulerResult};
pub use job::{Job, JobCallback, JobKind, JobOutcome, JobState};
