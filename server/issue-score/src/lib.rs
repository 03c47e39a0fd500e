//! Issue Priority Scoring Engine — deterministic, rule-based.
//!
//! Maps a raw issue snapshot (issue fields, comment thread, contributor stats
//! and organization membership) to a priority score with a named breakdown,
//! and recommends a maintenance action from that score and elapsed time.
//!
//! No DB, no network; pure computation with no shared state.

pub mod config;
pub mod decay;
pub mod engine;
pub mod error;
pub mod maintenance;
pub mod normalize;
pub mod rules;
pub mod scanner;
pub mod types;

pub use config::{Config, DedupScope, MaintenanceConfig};
pub use engine::{compute_score, Engine};
pub use error::ScoreError;
pub use types::{InboundIssueData, IssueSnapshot, ScoreResult, ScoreSummary};
