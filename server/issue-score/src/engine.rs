//! Core engine: folds the rule set over a snapshot into a score + breakdown.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::Config;
use crate::error::ScoreError;
use crate::maintenance;
use crate::normalize;
use crate::rules::{RuleContext, RULES};
use crate::scanner::Scanner;
use crate::types::*;

/// Score one snapshot at `now`. Pure: same inputs, same result.
pub fn compute_score(snapshot: &IssueSnapshot, now: DateTime<Utc>, config: &Config) -> ScoreResult {
  let scan = Scanner::new(config).scan_all(snapshot.texts(), config.dedup_scope);
  let ctx = RuleContext {
    snapshot,
    config,
    now,
    scan: &scan,
  };

  let mut breakdown = Breakdown::new();
  for (name, rule) in RULES {
    if let Some(value) = rule(&ctx) {
      debug!(issue = snapshot.number, rule = *name, value, "rule");
      breakdown.record(name, value);
    }
  }

  let score = breakdown.total();
  debug!(issue = snapshot.number, score, "scored");
  ScoreResult {
    score,
    breakdown,
    reference_count: scan.reference_count(),
  }
}

/// Stateless scoring engine bound to one configuration.
#[derive(Debug, Clone, Default)]
pub struct Engine {
  config: Config,
}

impl Engine {
  pub fn new(config: Config) -> Self {
    Self { config }
  }

  pub fn with_defaults() -> Self {
    Self::new(Config::default())
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn score(&self, snapshot: &IssueSnapshot, now: DateTime<Utc>) -> ScoreResult {
    compute_score(snapshot, now, &self.config)
  }

  /// Normalize raw issue data, score it and attach maintenance advice.
  pub fn process(&self, raw: &InboundIssueData, now: DateTime<Utc>) -> Result<ScoreSummary, ScoreError> {
    let snapshot = normalize::normalize(raw)?;
    let result = self.score(&snapshot, now);
    let advice = maintenance::advise(&snapshot, &result, now, &self.config);
    Ok(summarize(&snapshot, result, advice))
  }
}

fn summarize(snapshot: &IssueSnapshot, result: ScoreResult, advice: MaintenanceAdvice) -> ScoreSummary {
  ScoreSummary {
    number: snapshot.number,
    score: result.score,
    title: snapshot.title.clone(),
    comments: snapshot.comment_count(),
    references: result.reference_count,
    assignee: snapshot.assignee.clone(),
    milestone: snapshot.milestone.clone(),
    created: snapshot.created_at.map(|t| t.to_rfc3339()),
    updated: snapshot.updated_at.map(|t| t.to_rfc3339()),
    username: snapshot.author.clone(),
    avatar: snapshot.avatar.clone(),
    score_data: result.breakdown,
    maintenance: advice,
  }
}
