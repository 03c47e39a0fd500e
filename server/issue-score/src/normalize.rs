//! Normalize inbound issue data into an immutable `IssueSnapshot`.
//!
//! Only a missing issue (or one with no usable identity) is an error; every
//! other defect degrades the affected field to `None` and logs a warning.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::error::ScoreError;
use crate::types::*;

/// Parse and normalize raw issue data into a snapshot.
pub fn normalize(raw: &InboundIssueData) -> Result<IssueSnapshot, ScoreError> {
  let issue = raw
    .issue
    .as_ref()
    .ok_or_else(|| ScoreError::validation("issue", "missing issue object"))?;

  if issue.title.is_none() && issue.body.is_none() && issue.user.is_none() {
    return Err(ScoreError::validation(
      "issue",
      "has no title, body or author",
    ));
  }

  let number = match issue.number {
    Some(n) if n > 0 => n,
    _ => {
      return Err(ScoreError::validation(
        "issue.number",
        "must be a positive integer",
      ))
    }
  };

  let author = issue
    .user
    .as_ref()
    .and_then(|u| u.login.clone())
    .filter(|l| !l.is_empty());

  let labels = issue
    .labels
    .as_ref()
    .map(|labels| labels.iter().map(|l| l.name.clone()).collect::<BTreeSet<_>>());

  let comments = raw.issue_comments.as_ref().map(|comments| {
    comments
      .iter()
      .map(|c| Comment {
        author: c
          .user
          .as_ref()
          .and_then(|u| u.login.clone())
          .filter(|l| !l.is_empty()),
        body: c.body.clone(),
      })
      .collect::<Vec<_>>()
  });

  let contributions = raw.contributors.as_ref().map(|contributors| {
    let mut by_login = HashMap::new();
    for c in contributors {
      if let (Some(login), Some(count)) = (&c.login, c.contributions) {
        // Keep the first entry per login, like a list lookup would.
        by_login.entry(login.clone()).or_insert(count);
      }
    }
    by_login
  });

  let organization_members: HashSet<String> = raw
    .org_members
    .iter()
    .flatten()
    .filter_map(|m| m.login())
    .filter(|l| !l.is_empty())
    .map(str::to_string)
    .collect();

  Ok(IssueSnapshot {
    number,
    title: issue.title.clone().unwrap_or_default(),
    body: issue.body.clone().unwrap_or_default(),
    author,
    avatar: issue
      .user
      .as_ref()
      .and_then(|u| u.avatar_url.clone())
      .filter(|a| !a.is_empty()),
    assignee: issue
      .assignee
      .as_ref()
      .and_then(|u| u.login.clone())
      .filter(|a| !a.is_empty()),
    milestone: issue
      .milestone
      .as_ref()
      .and_then(|m| m.title.clone())
      .filter(|m| !m.is_empty()),
    created_at: parse_timestamp(number, "created_at", issue.created_at.as_deref()),
    updated_at: parse_timestamp(number, "updated_at", issue.updated_at.as_deref()),
    closed: issue.closed_at.as_deref().is_some_and(|c| !c.is_empty()),
    is_pull_request: issue.pull_request.as_ref().is_some_and(|p| !p.is_null()),
    labels,
    comments,
    contributions,
    organization_members,
  })
}

/// RFC 3339 timestamp, or `None` (logged) when absent or malformed.
fn parse_timestamp(number: u64, field: &str, value: Option<&str>) -> Option<DateTime<Utc>> {
  let value = value.filter(|v| !v.is_empty())?;
  match DateTime::parse_from_rfc3339(value) {
    Ok(ts) => Some(ts.with_timezone(&Utc)),
    Err(e) => {
      warn!(issue = number, field, value, error = %e, "ignoring malformed timestamp");
      None
    }
  }
}
