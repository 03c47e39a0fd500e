//! Content scanner: pulls typed artifacts out of free-form issue text.
//!
//! Links are classified into exactly one category, first match wins:
//! image -> video -> forum -> demo -> plain link. Cross-references are
//! `#<digits>` tokens. Code lines come from fenced blocks and 4-space indents.

use std::sync::OnceLock;

use regex::Regex;

use crate::config::{Config, DedupScope};

const FENCE: &str = "```";
const INDENT: &str = "    ";

fn reference_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"#\d+").unwrap())
}

/// Artifacts found in one or more text bodies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
  pub images: Vec<String>,
  pub videos: Vec<String>,
  pub forum_links: Vec<String>,
  pub demos: Vec<String>,
  /// Links not classified as image, video, forum or demo.
  pub links: Vec<String>,
  pub references: Vec<String>,
  pub code_lines: usize,
}

impl ScanResult {
  pub fn reference_count(&self) -> usize {
    self.references.len()
  }

  /// Fold another scan into this one. `PerText` keeps every entry (each
  /// text was already deduplicated on its own); `Thread` dedups across texts.
  pub fn absorb(&mut self, other: ScanResult, scope: DedupScope) {
    let merge = |into: &mut Vec<String>, from: Vec<String>| match scope {
      DedupScope::PerText => into.extend(from),
      DedupScope::Thread => {
        for item in from {
          push_unique(into, item);
        }
      }
    };
    merge(&mut self.images, other.images);
    merge(&mut self.videos, other.videos);
    merge(&mut self.forum_links, other.forum_links);
    merge(&mut self.demos, other.demos);
    merge(&mut self.links, other.links);
    merge(&mut self.references, other.references);
    self.code_lines += other.code_lines;
  }
}

/// Link classifier + text scanner, borrowing its match lists from `Config`.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
  min_link_len: usize,
  image_extensions: &'a [String],
  video_extensions: &'a [String],
  forum_host: &'a str,
  demo_domains: &'a [String],
}

impl<'a> Scanner<'a> {
  pub fn new(config: &'a Config) -> Self {
    Self {
      min_link_len: config.min_link_token_length,
      image_extensions: &config.image_extensions,
      video_extensions: &config.video_extensions,
      forum_host: &config.forum_host,
      demo_domains: &config.demo_domains,
    }
  }

  /// Scan one text body. Absent or empty text yields an empty result.
  pub fn scan(&self, text: Option<&str>) -> ScanResult {
    let mut out = ScanResult::default();
    let text = match text {
      Some(t) if !t.is_empty() => t,
      _ => return out,
    };

    let lowered = text.to_lowercase();
    for word in words(&lowered) {
      if self.is_link(word) {
        let bucket = match self.classify(word) {
          LinkKind::Image => &mut out.images,
          LinkKind::Video => &mut out.videos,
          LinkKind::Forum => &mut out.forum_links,
          LinkKind::Demo => &mut out.demos,
          LinkKind::Plain => &mut out.links,
        };
        push_unique(bucket, word.to_string());
      }

      let token = word.trim_end_matches('.');
      if reference_pattern().is_match(token) {
        push_unique(&mut out.references, token.to_string());
      }
    }

    out.code_lines = code_lines(text);
    out
  }

  /// Scan the issue body and every comment body, folding per `scope`.
  pub fn scan_all<'t>(
    &self,
    texts: impl IntoIterator<Item = Option<&'t str>>,
    scope: DedupScope,
  ) -> ScanResult {
    let mut total = ScanResult::default();
    for text in texts {
      total.absorb(self.scan(text), scope);
    }
    total
  }

  fn is_link(&self, word: &str) -> bool {
    word.chars().count() > self.min_link_len && (word.starts_with("http://") || word.starts_with("https://"))
  }

  pub fn classify(&self, link: &str) -> LinkKind {
    let link = link.trim().to_lowercase();
    if has_extension(&link, self.image_extensions) {
      LinkKind::Image
    } else if has_extension(&link, self.video_extensions) {
      LinkKind::Video
    } else if !self.forum_host.is_empty() && link.contains(&self.forum_host.to_lowercase()) {
      LinkKind::Forum
    } else if self
      .demo_domains
      .iter()
      .any(|d| !d.is_empty() && link.contains(&d.to_lowercase()))
    {
      LinkKind::Demo
    } else {
      LinkKind::Plain
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
  Image,
  Video,
  Forum,
  Demo,
  Plain,
}

/// Split on whitespace, quotes and brackets.
fn words(text: &str) -> impl Iterator<Item = &str> {
  text
    .split(|c: char| matches!(c, '\n' | '\t' | ' ' | '"' | '\'' | '(' | ')' | '[' | ']'))
    .filter(|w| !w.is_empty())
}

/// Extension match on the path, ignoring query string and fragment.
fn has_extension(link: &str, extensions: &[String]) -> bool {
  let path = link.split('?').next().unwrap_or(link);
  let path = path.split('#').next().unwrap_or(path);
  extensions.iter().any(|ext| {
    let ext = ext.trim_start_matches('.').to_lowercase();
    !ext.is_empty() && path.ends_with(&format!(".{}", ext))
  })
}

/// Count code lines in one body.
///
/// Every fence marker is first moved onto its own line, so an inline closing
/// fence still toggles. Lines are counted while inside a fence (the opening
/// fence line and the break moved in front of the closing fence included),
/// and every line starting with four spaces counts once more regardless of
/// fence state.
pub fn code_lines(text: &str) -> usize {
  let normalized = text.replace(FENCE, &format!("\n{}", FENCE));
  let lines: Vec<&str> = normalized.split('\n').collect();

  let mut inside = false;
  let mut fenced = 0;
  for line in &lines {
    if line.starts_with(FENCE) {
      inside = !inside;
    }
    if inside {
      fenced += 1;
    }
  }

  let indented = lines.iter().filter(|l| l.starts_with(INDENT)).count();
  fenced + indented
}

fn push_unique(into: &mut Vec<String>, item: String) {
  if !into.contains(&item) {
    into.push(item);
  }
}
