//! # taskpool
//!
//! Postgres-backed assignment engine for distributing translation tasks to a
//! pool of workers, one task per worker at a time.
//!
//! The core is the claim operation: a single transaction selects the oldest
//! pending task with `FOR UPDATE SKIP LOCKED`, optionally filtered by the
//! worker's language preferences (with an unfiltered fallback), and commits
//! the validated `pending -> in_progress` transition atomically with the
//! selection. Concurrent claimers never hand the same task to two workers.

pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod telemetry;
pub mod transition;
