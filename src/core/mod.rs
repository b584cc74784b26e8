//! Core application logic.
//!
//! This module contains:
//! - Review: candidate acceptance with due-date resolution
//! - Tracker: event-driven service tying extraction, storage and notifications together

pub mod review;
pub mod tracker;

// Re-export commonly used types
pub use review::accept_candidates;
pub use tracker::{MemoIngest, TaskTracker};
