//! Integration tests for the issue scoring engine.

use chrono::{DateTime, Duration, TimeZone, Utc};
use issue_score::normalize::normalize;
use issue_score::rules::RULES;
use issue_score::types::MaintenanceAction;
use issue_score::{compute_score, Config, Engine, InboundIssueData, IssueSnapshot};

fn now() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2025, 1, 20, 12, 0, 0).unwrap()
}

fn fixture_data() -> InboundIssueData {
  let json = r#"{
    "issue": {
      "number": 4821,
      "title": "Virtual scroll loses position after navigation",
      "body": "After navigating back, the virtual list jumps to the top. Related to #4100.\n\n```ts\nthis.nav.pop();\nthis.list.scrollTo(0);\n```\n\nRepro: https://codepen.io/dana/pen/abcdef\nScreenshot: https://i.imgur.com/shot.png",
      "user": {"login": "dana", "avatar_url": "https://avatars.example.com/dana"},
      "assignee": {"login": "core-1"},
      "milestone": {"title": "2.1"},
      "created_at": "2025-01-15T10:30:00Z",
      "updated_at": "2025-01-19T08:00:00Z",
      "labels": [{"name": "bug"}],
      "some_unknown_field": "ignored"
    },
    "issue_comments": [
      {"user": {"login": "eve"}, "body": "Same on Android, see https://forum.ionicframework.com/t/virtual-scroll/123"},
      {"user": {"login": "core-1"}, "body": "Thanks, can reproduce."},
      {"user": {"login": "dana"}, "body": "Video: https://example.com/capture.mp4"}
    ],
    "contributors": [{"login": "dana", "contributions": 3}],
    "org_members": [{"login": "core-1"}, "core-2"]
  }"#;
  serde_json::from_str(json).unwrap()
}

fn base_snapshot() -> IssueSnapshot {
  IssueSnapshot {
    number: 1,
    title: "A perfectly reasonable issue title".into(),
    body: "A body that is comfortably longer than the short body threshold.".into(),
    author: Some("dana".into()),
    ..Default::default()
  }
}

#[test]
fn full_issue_produces_summary() {
  let engine = Engine::with_defaults();
  let summary = engine.process(&fixture_data(), now()).unwrap();

  assert_eq!(summary.number, 4821);
  assert_eq!(summary.username.as_deref(), Some("dana"));
  assert_eq!(summary.assignee.as_deref(), Some("core-1"));
  assert_eq!(summary.milestone.as_deref(), Some("2.1"));
  assert_eq!(summary.comments, 3);
  assert_eq!(summary.references, 1);
  assert_eq!(summary.score, summary.score_data.total());

  let b = &summary.score_data;
  assert_eq!(b.get("core_team_member"), None);
  assert_eq!(b.get("each_contribution"), Some(3));
  assert_eq!(b.get("each_unique_commenter"), Some(2));
  assert_eq!(b.get("each_comment"), Some(3));
  assert_eq!(b.get("code_demos"), Some(10));
  assert_eq!(b.get("images"), Some(3));
  assert_eq!(b.get("videos"), Some(5));
  assert_eq!(b.get("forum_links"), Some(2));
  assert_eq!(b.get("links"), None);
  assert_eq!(b.get("issue_references"), Some(2));
  // ```ts, two code lines and the break before the closing fence.
  assert_eq!(b.get("code_snippets"), Some(5 + 4));
  assert_eq!(b.get("short_title_text"), None);

  assert_eq!(summary.maintenance.action, MaintenanceAction::None);
}

#[test]
fn summary_json_keeps_breakdown_order() {
  let engine = Engine::with_defaults();
  let summary = engine.process(&fixture_data(), now()).unwrap();
  let json = serde_json::to_string(&summary).unwrap();
  let score_data = &json[json.find("\"score_data\":").unwrap()..];

  let recorded: Vec<&str> = summary.score_data.iter().map(|(name, _)| name).collect();
  assert!(recorded.len() > 5, "fixture should exercise many rules: {:?}", recorded);

  // Every recorded rule shows up in the JSON, in RULES order.
  let positions: Vec<usize> = RULES
    .iter()
    .map(|(name, _)| *name)
    .filter(|name| recorded.contains(name))
    .map(|name| {
      score_data
        .find(&format!("\"{}\":", name))
        .unwrap_or_else(|| panic!("{} missing from {}", name, score_data))
    })
    .collect();
  assert_eq!(positions.len(), recorded.len());
  assert!(
    positions.windows(2).all(|w| w[0] < w[1]),
    "score_data keys out of rule order: {}",
    score_data
  );

  let value: serde_json::Value = serde_json::from_str(&json).unwrap();
  assert_eq!(value["maintenance"]["action"], "none");
  assert_eq!(value["created"], "2025-01-15T10:30:00+00:00");
}

#[test]
fn wrongly_typed_timestamp_only_skips_its_rule() {
  let raw: InboundIssueData = serde_json::from_str(
    r#"{"issue":{"number":3,"title":"Title long enough","body":"b","created_at":1700000000,
        "updated_at":"2025-01-19T12:00:00Z","user":"dana"}}"#,
  )
  .unwrap();
  let summary = Engine::with_defaults().process(&raw, now()).unwrap();
  assert_eq!(summary.score_data.get("daily_decay_since_creation"), None);
  assert_eq!(summary.score_data.get("daily_decay_since_last_update"), Some(29));
  assert_eq!(summary.created, None);
  assert_eq!(summary.username, None);
}

#[test]
fn bad_comment_does_not_drop_the_thread() {
  let raw: InboundIssueData = serde_json::from_str(
    r#"{
      "issue": {"number": 8, "title": "Title long enough", "body": "b", "user": {"login": "dana"},
                "labels": [{"name": "high priority"}, {"colour": "red"}]},
      "issue_comments": [
        {"user": {"login": "eve"}, "body": "demo https://codepen.io/eve/pen/qwerty"},
        {"user": "ghost", "body": "see #31"},
        17
      ]
    }"#,
  )
  .unwrap();
  let summary = Engine::with_defaults().process(&raw, now()).unwrap();
  let b = &summary.score_data;
  assert_eq!(summary.comments, 2);
  assert_eq!(b.get("each_comment"), Some(2));
  assert_eq!(b.get("each_unique_commenter"), Some(2));
  assert_eq!(b.get("code_demos"), Some(10));
  assert_eq!(b.get("issue_references"), Some(2));
  assert_eq!(b.get("high_priority"), Some(20));
}

#[test]
fn deterministic_output_across_runs() {
  let data = fixture_data();
  let s1 = Engine::with_defaults().process(&data, now()).unwrap();
  let s2 = Engine::with_defaults().process(&data, now()).unwrap();
  assert_eq!(
    serde_json::to_string(&s1).unwrap(),
    serde_json::to_string(&s2).unwrap(),
    "Same inputs must produce identical JSON output"
  );
}

#[test]
fn missing_issue_gives_clear_error() {
  let raw: InboundIssueData =
    serde_json::from_str(r#"{"issue_comments": [], "org_members": []}"#).unwrap();
  let err = Engine::with_defaults().process(&raw, now()).unwrap_err();
  assert!(err.to_string().contains("issue"), "Error should mention the field: {}", err);
}

#[test]
fn malformed_parts_degrade_instead_of_failing() {
  let raw: InboundIssueData = serde_json::from_str(
    r#"{
      "issue": {"number": 3, "title": "Title long enough", "body": "b", "created_at": "not-a-date", "labels": "bug"},
      "issue_comments": {"not": "a list"},
      "contributors": null
    }"#,
  )
  .unwrap();
  let summary = Engine::with_defaults().process(&raw, now()).unwrap();
  assert_eq!(summary.score_data.get("daily_decay_since_creation"), None);
  assert_eq!(summary.score_data.get("each_comment"), None);
  assert_eq!(summary.comments, 0);
}

#[test]
fn rule_independence_when_weight_zeroed() {
  let snapshot = normalize(&fixture_data()).unwrap();
  let full = compute_score(&snapshot, now(), &Config::default());
  let before = full.breakdown.get("code_demos").unwrap();

  let cfg = Config {
    demo_weight: 0,
    ..Config::default()
  };
  let without = compute_score(&snapshot, now(), &cfg);

  assert_eq!(without.breakdown.get("code_demos"), None);
  assert_eq!(without.score, full.score - before);
  for (name, value) in full.breakdown.iter().filter(|(n, _)| *n != "code_demos") {
    assert_eq!(without.breakdown.get(name), Some(value), "rule {} changed", name);
  }
}

#[test]
fn scenario_a_repeated_reference_counts_once() {
  let mut s = base_snapshot();
  s.body = "see #12 and #12 again, this body is long enough".into();
  let r = compute_score(&s, now(), &Config::default());
  assert_eq!(r.reference_count, 1);
  assert_eq!(r.breakdown.get("issue_references"), Some(2));
}

#[test]
fn scenario_b_image_with_query_string() {
  let mut s = base_snapshot();
  s.body = "Screenshot attached: http://example.com/screenshot.PNG?x=1 as shown".into();
  let r = compute_score(&s, now(), &Config::default());
  assert_eq!(r.breakdown.get("images"), Some(3));
  assert_eq!(r.breakdown.get("links"), None);
}

#[test]
fn scenario_c_fenced_and_indented_code() {
  let mut s = base_snapshot();
  // Five fence lines (including the break moved before the closing fence)
  // plus two indented lines outside it.
  s.body = "Repro below\n```\nlet a = 1;\nlet b = 2;\nrun(a, b);\n```\nand also\n    foo();\n    bar();".into();
  let cfg = Config::default();
  let r = compute_score(&s, now(), &cfg);
  let expected = cfg.snippet_base_bonus + (7 * cfg.snippet_per_line_weight).min(cfg.snippet_line_cap);
  assert_eq!(r.breakdown.get("code_snippets"), Some(expected));
}

#[test]
fn scenario_d_old_issue_decays_to_zero() {
  let mut s = base_snapshot();
  s.created_at = Some(now() - Duration::days(1000));
  let cfg = Config {
    creation_decay_start: 50.0,
    creation_decay_exponent: 1.0,
    ..Config::default()
  };
  let r = compute_score(&s, now(), &cfg);
  assert_eq!(r.breakdown.get("daily_decay_since_creation"), None);
  assert!(r.breakdown.iter().all(|(n, _)| n != "daily_decay_since_creation"));
}

#[test]
fn scenario_e_member_gets_only_core_team_bonus() {
  let mut s = base_snapshot();
  s.organization_members.insert("dana".into());
  s.contributions = Some([("dana".to_string(), 50)].into_iter().collect());
  let r = compute_score(&s, now(), &Config::default());
  assert_eq!(r.breakdown.get("core_team_member"), Some(15));
  assert_eq!(r.breakdown.get("each_contribution"), None);
}

#[test]
fn scenario_f_short_title_and_body_both_penalized() {
  let mut s = base_snapshot();
  s.title = "help".into();
  s.body = "broken".into();
  let r = compute_score(&s, now(), &Config::default());
  assert_eq!(r.breakdown.get("short_title_text"), Some(-10));
  assert_eq!(r.breakdown.get("short_body_text"), Some(-15));
  assert_eq!(r.breakdown.iter().filter(|(_, v)| *v < 0).count(), 2);
  assert_eq!(r.score, -25);
}

#[test]
fn stale_unreferenced_issue_is_recommended_for_closing() {
  let raw: InboundIssueData = serde_json::from_str(
    r#"{"issue": {"number": 77, "title": "Something old and forgotten", "body": "no activity",
        "created_at": "2024-01-01T00:00:00Z", "updated_at": "2024-06-01T00:00:00Z"}}"#,
  )
  .unwrap();
  let summary = Engine::with_defaults().process(&raw, now()).unwrap();
  assert_eq!(summary.maintenance.action, MaintenanceAction::CloseInactive);
}
