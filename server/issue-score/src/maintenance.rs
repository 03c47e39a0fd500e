//! Maintenance advice: which automated action a sweep should take for an
//! issue. Recommendation only; nothing here mutates the issue.

use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::decay::elapsed_days;
use crate::types::{IssueSnapshot, MaintenanceAction, MaintenanceAdvice, ScoreResult};

fn advice(action: MaintenanceAction, reason: impl Into<String>) -> MaintenanceAdvice {
  MaintenanceAdvice {
    action,
    reason: reason.into(),
  }
}

/// Recommend an action from the snapshot, its score result and elapsed time.
pub fn advise(
  snapshot: &IssueSnapshot,
  result: &ScoreResult,
  now: DateTime<Utc>,
  config: &Config,
) -> MaintenanceAdvice {
  let m = &config.maintenance;

  if snapshot.is_pull_request {
    return advice(MaintenanceAction::Skip, "pull request");
  }
  if snapshot.closed {
    return advice(MaintenanceAction::Skip, "already closed");
  }

  let Some(updated) = snapshot.updated_at else {
    return advice(MaintenanceAction::None, "no update timestamp");
  };
  let idle = i64::try_from(elapsed_days(now, updated)).unwrap_or(i64::MAX);

  if snapshot.has_label(&config.needs_reply_label_name) && idle >= m.close_noreply_after_days {
    return advice(
      MaintenanceAction::CloseNoReply,
      format!("awaiting reply for {} days", idle),
    );
  }

  if idle < m.close_inactive_after_days {
    return advice(MaintenanceAction::None, format!("updated {} days ago", idle));
  }

  if let Some(label) = m
    .do_not_close_labels
    .iter()
    .find(|label| snapshot.has_label(label))
  {
    return advice(MaintenanceAction::None, format!("protected by label '{}'", label));
  }
  if m.do_not_close_min_comments > 0 && snapshot.comment_count() >= m.do_not_close_min_comments {
    return advice(
      MaintenanceAction::None,
      format!("{} comments", snapshot.comment_count()),
    );
  }
  if m.do_not_close_when_referenced && result.reference_count > 0 {
    return advice(
      MaintenanceAction::None,
      format!("referenced {} times", result.reference_count),
    );
  }

  advice(
    MaintenanceAction::CloseInactive,
    format!("inactive for {} days", idle),
  )
}
