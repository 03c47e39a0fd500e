//! Binary entrypoint: read JSON lines from stdin, write JSON lines to stdout.
//!
//! Each input line is an InboundIssueData. Output lines are either:
//! - A ScoreSummary (score, breakdown, maintenance advice)
//! - An ErrorOutput (when input validation fails)
//!
//! Env:
//! - `ISSUE_SCORE_CONFIG`: optional TOML file overriding default weights.
//! - `ISSUE_SCORE_NOW`: optional RFC 3339 instant to score against.
//! - `RUST_LOG`: log filter (logs go to stderr).

use std::io::{self, BufRead, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use issue_score::types::ErrorOutput;
use issue_score::{Config, Engine, InboundIssueData, ScoreError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(io::stderr)
    .init();

  if let Err(e) = run() {
    let _ = writeln!(io::stderr(), "issue-score error: {}", e);
    std::process::exit(1);
  }
}

fn load_config() -> Result<Config, ScoreError> {
  match std::env::var("ISSUE_SCORE_CONFIG") {
    Ok(path) if !path.is_empty() => {
      info!(path = %path, "loading config");
      Config::load(Path::new(&path))
    }
    _ => Ok(Config::default()),
  }
}

fn scoring_instant() -> Result<DateTime<Utc>, ScoreError> {
  match std::env::var("ISSUE_SCORE_NOW") {
    Ok(s) if !s.is_empty() => DateTime::parse_from_rfc3339(&s)
      .map(|t| t.with_timezone(&Utc))
      .map_err(|e| ScoreError::parse(format!("ISSUE_SCORE_NOW: {}", e))),
    _ => Ok(Utc::now()),
  }
}

fn run() -> Result<(), ScoreError> {
  let engine = Engine::new(load_config()?);
  let now = scoring_instant()?;

  let stdin = io::stdin();
  let stdout = io::stdout();
  let mut out = io::BufWriter::new(stdout.lock());

  for line in stdin.lock().lines() {
    let line = line?;

    // Skip blank lines.
    let trimmed = line.trim();
    if trimmed.is_empty() {
      continue;
    }

    let raw: InboundIssueData = match serde_json::from_str(trimmed) {
      Ok(v) => v,
      Err(e) => {
        warn!(error = %e, "unparseable input line");
        let err = ErrorOutput::new(format!("json parse: {}", e));
        serde_json::to_writer(&mut out, &err)?;
        writeln!(out)?;
        continue;
      }
    };

    match engine.process(&raw, now) {
      Ok(summary) => serde_json::to_writer(&mut out, &summary)?,
      Err(e) => {
        warn!(error = %e, "rejected issue");
        let err = match &e {
          ScoreError::Validation { field, reason } => {
            ErrorOutput::new(reason.clone()).with_field(field.clone())
          }
          _ => ErrorOutput::new(e.to_string()),
        };
        serde_json::to_writer(&mut out, &err)?;
      }
    }
    writeln!(out)?;
  }

  out.flush()?;
  Ok(())
}
