//! Core types for the scoring engine (JSON contracts + internal models).

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Inbound types (JSON contract — raw platform API shapes)
// ---------------------------------------------------------------------------

/// One inbound line from stdin: everything fetched for a single issue.
/// Unknown fields are silently ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundIssueData {
  #[serde(default)]
  pub issue: Option<InboundIssue>,
  /// Comment thread. Malformed entries are dropped one by one.
  #[serde(default, deserialize_with = "lenient_items")]
  pub issue_comments: Option<Vec<InboundComment>>,
  /// Repository contributor stats.
  #[serde(default, deserialize_with = "lenient_items")]
  pub contributors: Option<Vec<InboundContributor>>,
  #[serde(default, deserialize_with = "lenient_items")]
  pub org_members: Option<Vec<InboundMember>>,
}

/// Every field degrades to `None` on a wrong type; `normalize` decides
/// whether what is left is still a usable issue.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundIssue {
  #[serde(default, deserialize_with = "lenient")]
  pub number: Option<u64>,
  #[serde(default, deserialize_with = "lenient")]
  pub title: Option<String>,
  #[serde(default, deserialize_with = "lenient")]
  pub body: Option<String>,
  #[serde(default, deserialize_with = "lenient")]
  pub user: Option<InboundUser>,
  #[serde(default, deserialize_with = "lenient")]
  pub assignee: Option<InboundUser>,
  #[serde(default, deserialize_with = "lenient")]
  pub milestone: Option<InboundMilestone>,
  #[serde(default, deserialize_with = "lenient")]
  pub created_at: Option<String>,
  #[serde(default, deserialize_with = "lenient")]
  pub updated_at: Option<String>,
  #[serde(default, deserialize_with = "lenient")]
  pub closed_at: Option<String>,
  #[serde(default, deserialize_with = "lenient_items")]
  pub labels: Option<Vec<InboundLabel>>,
  /// Present (any shape) only when the "issue" is a pull request.
  #[serde(default)]
  pub pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundUser {
  #[serde(default, deserialize_with = "lenient")]
  pub login: Option<String>,
  #[serde(default, deserialize_with = "lenient")]
  pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundMilestone {
  #[serde(default, deserialize_with = "lenient")]
  pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboundLabel {
  pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundComment {
  #[serde(default, deserialize_with = "lenient")]
  pub user: Option<InboundUser>,
  #[serde(default, deserialize_with = "lenient")]
  pub body: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboundContributor {
  #[serde(default, deserialize_with = "lenient")]
  pub login: Option<String>,
  #[serde(default, deserialize_with = "lenient")]
  pub contributions: Option<u64>,
}

/// Organization members arrive either as bare logins or as user objects.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InboundMember {
  Login(String),
  User(InboundUser),
}

impl InboundMember {
  pub fn login(&self) -> Option<&str> {
    match self {
      Self::Login(login) => Some(login.as_str()),
      Self::User(user) => user.login.as_deref(),
    }
  }
}

/// Deserialize an optional field, degrading to `None` (with a warning) when
/// the value is present but has the wrong shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
  D: Deserializer<'de>,
  T: DeserializeOwned,
{
  let value = Option::<serde_json::Value>::deserialize(deserializer)?;
  match value {
    None | Some(serde_json::Value::Null) => Ok(None),
    Some(v) => Ok(decode_or_warn(v)),
  }
}

/// Deserialize an optional list entry by entry. A malformed entry is skipped
/// with a warning; a value that is not a list at all degrades to `None`.
fn lenient_items<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
  D: Deserializer<'de>,
  T: DeserializeOwned,
{
  let value = Option::<serde_json::Value>::deserialize(deserializer)?;
  match value {
    None | Some(serde_json::Value::Null) => Ok(None),
    Some(serde_json::Value::Array(items)) => {
      Ok(Some(items.into_iter().filter_map(decode_or_warn).collect()))
    }
    Some(other) => {
      tracing::warn!(value = %other, "ignoring malformed list");
      Ok(None)
    }
  }
}

fn decode_or_warn<T: DeserializeOwned>(value: serde_json::Value) -> Option<T> {
  match serde_json::from_value(value) {
    Ok(parsed) => Some(parsed),
    Err(e) => {
      tracing::warn!(error = %e, "ignoring malformed field");
      None
    }
  }
}

// ---------------------------------------------------------------------------
// Internal normalized types
// ---------------------------------------------------------------------------

/// One comment in the issue thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
  pub author: Option<String>,
  pub body: Option<String>,
}

/// Immutable bundle of issue + thread + author data scored in one call.
///
/// Every optional field is explicit: `None` means "not provided" and skips
/// the rules that depend on it, which is different from an empty collection.
#[derive(Debug, Clone, Default)]
pub struct IssueSnapshot {
  pub number: u64,
  pub title: String,
  pub body: String,
  pub author: Option<String>,
  pub avatar: Option<String>,
  pub assignee: Option<String>,
  pub milestone: Option<String>,
  pub created_at: Option<DateTime<Utc>>,
  pub updated_at: Option<DateTime<Utc>>,
  pub closed: bool,
  pub is_pull_request: bool,
  pub labels: Option<BTreeSet<String>>,
  pub comments: Option<Vec<Comment>>,
  /// Contribution count per login on the repository.
  pub contributions: Option<HashMap<String, u64>>,
  /// Logins considered core team.
  pub organization_members: HashSet<String>,
}

impl IssueSnapshot {
  pub fn has_label(&self, name: &str) -> bool {
    self
      .labels
      .as_ref()
      .is_some_and(|labels| labels.contains(name))
  }

  pub fn comment_count(&self) -> usize {
    self.comments.as_ref().map_or(0, Vec::len)
  }

  pub fn author_is_member(&self) -> bool {
    self
      .author
      .as_ref()
      .is_some_and(|a| self.organization_members.contains(a))
  }

  /// The issue body followed by every comment body, in thread order.
  pub fn texts(&self) -> impl Iterator<Item = Option<&str>> {
    std::iter::once(Some(self.body.as_str())).chain(
      self
        .comments
        .iter()
        .flatten()
        .map(|c| c.body.as_deref()),
    )
  }
}

// ---------------------------------------------------------------------------
// Score result
// ---------------------------------------------------------------------------

/// Named, signed contributions in rule order. Zero contributions are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Breakdown(Vec<(String, i64)>);

impl Breakdown {
  pub fn new() -> Self {
    Self::default()
  }

  /// Record a contribution; zero values are dropped.
  pub fn record(&mut self, rule: &str, value: i64) {
    if value != 0 {
      self.0.push((rule.to_string(), value));
    }
  }

  pub fn get(&self, rule: &str) -> Option<i64> {
    self.0.iter().find(|(name, _)| name == rule).map(|(_, v)| *v)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
    self.0.iter().map(|(name, v)| (name.as_str(), *v))
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// Saturating sum, so extreme weights clamp instead of overflowing.
  pub fn total(&self) -> i64 {
    self.0.iter().fold(0, |acc, (_, v)| acc.saturating_add(*v))
  }
}

impl Serialize for Breakdown {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.0.len()))?;
    for (name, value) in &self.0 {
      map.serialize_entry(name, value)?;
    }
    map.end()
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreResult {
  pub score: i64,
  pub breakdown: Breakdown,
  /// Distinct `#N` cross-references; feeds "do not close if referenced".
  pub reference_count: usize,
}

// ---------------------------------------------------------------------------
// Maintenance advice
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceAction {
  None,
  CloseInactive,
  CloseNoReply,
  Skip,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaintenanceAdvice {
  pub action: MaintenanceAction,
  pub reason: String,
}

// ---------------------------------------------------------------------------
// Output types (JSON contract — what we emit)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ScoreSummary {
  pub number: u64,
  pub score: i64,
  pub title: String,
  pub comments: usize,
  pub references: usize,
  pub assignee: Option<String>,
  pub milestone: Option<String>,
  pub created: Option<String>,
  pub updated: Option<String>,
  pub username: Option<String>,
  pub avatar: Option<String>,
  pub score_data: Breakdown,
  pub maintenance: MaintenanceAdvice,
}

// ---------------------------------------------------------------------------
// CLI stream wrappers
// ---------------------------------------------------------------------------

/// Structured error output for invalid input lines.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<String>,
}

impl ErrorOutput {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      error: true,
      message: message.into(),
      field: None,
    }
  }

  pub fn with_field(mut self, field: impl Into<String>) -> Self {
    self.field = Some(field.into());
    self
  }
}
