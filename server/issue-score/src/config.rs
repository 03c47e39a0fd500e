//! Engine configuration with sane defaults.
//!
//! Every weight is a plain field so a partial TOML file (or a struct update
//! in code) can retune a single rule without touching the others.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ScoreError;

/// How far link/reference deduplication reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupScope {
  /// Dedup within each text body (issue body, each comment) and sum the counts.
  #[default]
  PerText,
  /// Dedup across the issue body and every comment together.
  Thread,
}

/// Tunable weights, thresholds and match lists for issue scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Flat bonus when the author is an organization member.
  pub core_team_bonus: i64,
  /// Points per repository contribution (non-members only).
  pub contribution_weight: i64,
  pub contribution_max: i64,

  pub short_title_length: usize,
  pub short_title_penalty: i64,
  pub short_body_length: usize,
  pub short_body_penalty: i64,

  /// Body length bonus: `floor(len / body_chars_per_point) * body_char_weight`, capped.
  pub body_chars_per_point: usize,
  pub body_char_weight: i64,
  pub body_char_max: i64,

  pub creation_decay_exponent: f64,
  pub creation_decay_start: f64,
  pub update_decay_exponent: f64,
  pub update_decay_start: f64,

  pub high_priority_label_name: String,
  pub high_priority_bonus: i64,
  pub needs_reply_label_name: String,
  pub needs_reply_penalty: i64,

  pub unique_commenter_weight: i64,
  pub comment_weight: i64,

  pub snippet_base_bonus: i64,
  pub snippet_per_line_weight: i64,
  pub snippet_line_cap: i64,

  /// Host substrings marking a link as a live code demo.
  pub demo_domains: Vec<String>,
  pub demo_weight: i64,
  /// File extensions (no leading dot) marking a link as a video.
  pub video_extensions: Vec<String>,
  pub video_weight: i64,
  /// File extensions (no leading dot) marking a link as an image.
  pub image_extensions: Vec<String>,
  pub image_weight: i64,
  pub forum_host: String,
  pub forum_link_weight: i64,
  pub link_weight: i64,
  pub reference_weight: i64,

  /// A token must be strictly longer than this to count as a link.
  pub min_link_token_length: usize,
  pub dedup_scope: DedupScope,

  pub maintenance: MaintenanceConfig,
}

/// Thresholds for maintenance recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceConfig {
  /// Recommend closing after this many days without an update.
  pub close_inactive_after_days: i64,
  /// Recommend closing a needs-reply issue after this many quiet days.
  pub close_noreply_after_days: i64,
  /// Issues with at least this many comments are never closed as inactive (0 disables).
  pub do_not_close_min_comments: usize,
  /// Referenced issues are never closed as inactive.
  pub do_not_close_when_referenced: bool,
  /// Issues carrying any of these labels are never closed as inactive.
  pub do_not_close_labels: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
  items.iter().map(|s| s.to_string()).collect()
}

impl Default for Config {
  fn default() -> Self {
    Self {
      core_team_bonus: 15,
      contribution_weight: 1,
      contribution_max: 20,
      short_title_length: 12,
      short_title_penalty: 10,
      short_body_length: 40,
      short_body_penalty: 15,
      body_chars_per_point: 200,
      body_char_weight: 1,
      body_char_max: 10,
      creation_decay_exponent: 1.4,
      creation_decay_start: 50.0,
      update_decay_exponent: 1.6,
      update_decay_start: 30.0,
      high_priority_label_name: "high priority".into(),
      high_priority_bonus: 20,
      needs_reply_label_name: "needs reply".into(),
      needs_reply_penalty: 20,
      unique_commenter_weight: 2,
      comment_weight: 1,
      snippet_base_bonus: 5,
      snippet_per_line_weight: 1,
      snippet_line_cap: 15,
      demo_domains: strings(&["codepen", "plnkr", "jsbin", "jsfiddle"]),
      demo_weight: 10,
      video_extensions: strings(&[
        "mov", "qt", "avi", "wmv", "mp4", "m4p", "m4v", "mpg", "mpeg", "asf", "webm",
      ]),
      video_weight: 5,
      image_extensions: strings(&["png", "jpg", "jpeg", "gif", "webp", "svg", "psd", "ai"]),
      image_weight: 3,
      forum_host: "forum.ionicframework.com".into(),
      forum_link_weight: 2,
      link_weight: 1,
      reference_weight: 2,
      min_link_token_length: 12,
      dedup_scope: DedupScope::PerText,
      maintenance: MaintenanceConfig::default(),
    }
  }
}

impl Default for MaintenanceConfig {
  fn default() -> Self {
    Self {
      close_inactive_after_days: 90,
      close_noreply_after_days: 30,
      do_not_close_min_comments: 0,
      do_not_close_when_referenced: true,
      do_not_close_labels: strings(&["in progress", "ready", "high priority"]),
    }
  }
}

impl Config {
  /// Parse a (possibly partial) TOML document; absent keys keep their defaults.
  pub fn from_toml_str(s: &str) -> Result<Self, ScoreError> {
    toml::from_str(s).map_err(|e| ScoreError::Config(e.to_string()))
  }

  /// Read and parse a TOML config file.
  pub fn load(path: &Path) -> Result<Self, ScoreError> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| ScoreError::Config(format!("{}: {}", path.display(), e)))
  }
}
