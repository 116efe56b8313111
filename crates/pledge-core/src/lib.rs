//! # pledge-core
//!
//! Core types, traits, and pure logic for pledgewatch community notes:
//! fact-check annotations attached to tracked promises.
//!
//! This crate owns the note entity model, the error taxonomy, the repository
//! and scorer interfaces, and the rules that decide what gets shown:
//! the deletion guard, the display ranker, and the statistics aggregator.
//! It performs no I/O.
//!
//! ## Structured log fields
//!
//! All crates log with `tracing` using the same field names:
//! `subsystem` ("api", "db", "core"), `component`, `op`, `note_id`,
//! `promise_id`, `author_id`, `result_count`, `duration_ms`, `error`.

pub mod defaults;
pub mod error;
pub mod guard;
pub mod models;
pub mod ranking;
pub mod sources;
pub mod stats;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use guard::{check_delete_parts, check_deletable};
pub use models::*;
pub use ranking::rank_for_display;
pub use sources::{decode_sources, encode_sources};
pub use stats::{helpful_by_classification, summarize, NoteSetStats};
pub use traits::*;
