//! Power-law time decay favoring new and recently touched issues.

use chrono::{DateTime, Utc};

/// `floor(start - min(days^exponent, start))`, always in `[0, start]`.
pub fn decay(elapsed_days: u64, start: f64, exponent: f64) -> i64 {
  let start = start.max(0.0);
  let penalty = (elapsed_days as f64).powf(exponent);
  // NaN (e.g. 0^negative) falls back to the full penalty.
  let penalty = if penalty.is_nan() { start } else { penalty.min(start) };
  (start - penalty).floor() as i64
}

/// Whole days between two instants, ignoring direction so a future-dated
/// reference still decays normally.
pub fn elapsed_days(now: DateTime<Utc>, reference: DateTime<Utc>) -> u64 {
  (now - reference).num_days().unsigned_abs()
}
