//! Scoring rules. Each rule is an independent function of the snapshot,
//! config, scoring instant and the thread-wide scan; it returns `None` when
//! its inputs are absent. The engine sums whatever comes back.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::decay::{decay, elapsed_days};
use crate::scanner::ScanResult;
use crate::types::IssueSnapshot;

/// Everything a rule may look at.
pub struct RuleContext<'a> {
  pub snapshot: &'a IssueSnapshot,
  pub config: &'a Config,
  pub now: DateTime<Utc>,
  /// Scan of the issue body plus every comment body.
  pub scan: &'a ScanResult,
}

pub type RuleFn = fn(&RuleContext) -> Option<i64>;

/// Rules in breakdown order.
pub const RULES: &[(&str, RuleFn)] = &[
  ("core_team_member", core_team_member),
  ("each_contribution", each_contribution),
  ("short_title_text", short_title_text),
  ("short_body_text", short_body_text),
  ("every_x_characters_in_body", every_x_characters_in_body),
  ("daily_decay_since_creation", daily_decay_since_creation),
  ("daily_decay_since_last_update", daily_decay_since_last_update),
  ("high_priority", high_priority),
  ("awaiting_reply", awaiting_reply),
  ("each_unique_commenter", each_unique_commenter),
  ("each_comment", each_comment),
  ("code_snippets", code_snippets),
  ("code_demos", code_demos),
  ("videos", videos),
  ("images", images),
  ("forum_links", forum_links),
  ("links", links),
  ("issue_references", issue_references),
];

fn times(count: usize, weight: i64) -> i64 {
  i64::try_from(count).unwrap_or(i64::MAX).saturating_mul(weight)
}

// ---------------------------------------------------------------------------
// Repo / organization
// ---------------------------------------------------------------------------

pub fn core_team_member(ctx: &RuleContext) -> Option<i64> {
  ctx
    .snapshot
    .author_is_member()
    .then_some(ctx.config.core_team_bonus)
}

/// Skipped entirely for organization members.
pub fn each_contribution(ctx: &RuleContext) -> Option<i64> {
  let s = ctx.snapshot;
  if s.author_is_member() {
    return None;
  }
  let author = s.author.as_ref()?;
  let count = *s.contributions.as_ref()?.get(author)?;
  let count = i64::try_from(count).unwrap_or(i64::MAX);
  Some(
    count
      .saturating_mul(ctx.config.contribution_weight)
      .min(ctx.config.contribution_max),
  )
}

// ---------------------------------------------------------------------------
// Issue text
// ---------------------------------------------------------------------------

pub fn short_title_text(ctx: &RuleContext) -> Option<i64> {
  (ctx.snapshot.title.chars().count() < ctx.config.short_title_length)
    .then_some(ctx.config.short_title_penalty.saturating_neg())
}

pub fn short_body_text(ctx: &RuleContext) -> Option<i64> {
  (ctx.snapshot.body.chars().count() < ctx.config.short_body_length)
    .then_some(ctx.config.short_body_penalty.saturating_neg())
}

pub fn every_x_characters_in_body(ctx: &RuleContext) -> Option<i64> {
  let per_point = ctx.config.body_chars_per_point;
  if per_point == 0 {
    return None;
  }
  let points = ctx.snapshot.body.chars().count() / per_point;
  Some(times(points, ctx.config.body_char_weight).min(ctx.config.body_char_max))
}

// ---------------------------------------------------------------------------
// Time decay
// ---------------------------------------------------------------------------

pub fn daily_decay_since_creation(ctx: &RuleContext) -> Option<i64> {
  let created = ctx.snapshot.created_at?;
  Some(decay(
    elapsed_days(ctx.now, created),
    ctx.config.creation_decay_start,
    ctx.config.creation_decay_exponent,
  ))
}

pub fn daily_decay_since_last_update(ctx: &RuleContext) -> Option<i64> {
  let updated = ctx.snapshot.updated_at?;
  Some(decay(
    elapsed_days(ctx.now, updated),
    ctx.config.update_decay_start,
    ctx.config.update_decay_exponent,
  ))
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

pub fn high_priority(ctx: &RuleContext) -> Option<i64> {
  ctx
    .snapshot
    .has_label(&ctx.config.high_priority_label_name)
    .then_some(ctx.config.high_priority_bonus)
}

pub fn awaiting_reply(ctx: &RuleContext) -> Option<i64> {
  ctx
    .snapshot
    .has_label(&ctx.config.needs_reply_label_name)
    .then_some(ctx.config.needs_reply_penalty.saturating_neg())
}

// ---------------------------------------------------------------------------
// Engagement
// ---------------------------------------------------------------------------

/// Distinct commenters other than the author and organization members.
pub fn each_unique_commenter(ctx: &RuleContext) -> Option<i64> {
  let s = ctx.snapshot;
  let comments = s.comments.as_ref()?;
  let commenters: HashSet<&str> = comments
    .iter()
    .filter_map(|c| c.author.as_deref())
    .filter(|login| !login.is_empty())
    .filter(|login| !s.organization_members.contains(*login))
    .filter(|login| s.author.as_deref() != Some(*login))
    .collect();
  Some(times(commenters.len(), ctx.config.unique_commenter_weight))
}

pub fn each_comment(ctx: &RuleContext) -> Option<i64> {
  let comments = ctx.snapshot.comments.as_ref()?;
  Some(times(comments.len(), ctx.config.comment_weight))
}

// ---------------------------------------------------------------------------
// Content artifacts (issue body + comments)
// ---------------------------------------------------------------------------

pub fn code_snippets(ctx: &RuleContext) -> Option<i64> {
  let lines = ctx.scan.code_lines;
  if lines == 0 {
    return None;
  }
  let per_line = times(lines, ctx.config.snippet_per_line_weight).min(ctx.config.snippet_line_cap);
  Some(ctx.config.snippet_base_bonus.saturating_add(per_line))
}

pub fn code_demos(ctx: &RuleContext) -> Option<i64> {
  Some(times(ctx.scan.demos.len(), ctx.config.demo_weight))
}

pub fn videos(ctx: &RuleContext) -> Option<i64> {
  Some(times(ctx.scan.videos.len(), ctx.config.video_weight))
}

pub fn images(ctx: &RuleContext) -> Option<i64> {
  Some(times(ctx.scan.images.len(), ctx.config.image_weight))
}

pub fn forum_links(ctx: &RuleContext) -> Option<i64> {
  Some(times(ctx.scan.forum_links.len(), ctx.config.forum_link_weight))
}

pub fn links(ctx: &RuleContext) -> Option<i64> {
  Some(times(ctx.scan.links.len(), ctx.config.link_weight))
}

pub fn issue_references(ctx: &RuleContext) -> Option<i64> {
  Some(times(ctx.scan.reference_count(), ctx.config.reference_weight))
}
