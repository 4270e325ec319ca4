use crate::error::FilterError;
use crate::wildcard::WildcardQuery;

/// Outcome of checking one decoded record against a [`QueryFilter`].
///
/// ```text
///   ts > end + margin ──────────────────────────► StopScanning
///   ts outside [begin, end] ────────────────────► Reject
///   patterns set and none match ────────────────► Reject
///   otherwise ──────────────────────────────────► Accept
/// ```
///
/// `StopScanning` relies on timestamps being non-decreasing: once one record
/// is past the end of the range, no later record can fall back inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterVerdict {
  /// The record matches. `pattern` is the index of the first pattern that
  /// matched, or `None` when the filter has no patterns.
  Accept { pattern: Option<usize> },
  /// The record doesn't match; later records still might.
  Reject,
  /// No later record can match.
  StopScanning,
}

/// Which pattern (if any) matched a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternMatch<'a> {
  /// The filter has no patterns, so every message matches.
  Unconstrained,
  /// The first pattern, in insertion order, that matched.
  Matched {
    index: usize,
    query: &'a WildcardQuery,
  },
  NoMatch,
}

impl PatternMatch<'_> {
  pub fn is_match(&self) -> bool {
    !matches!(self, Self::NoMatch)
  }
}

/// Search predicate applied to every decoded record: an optional inclusive
/// time range plus an ordered list of wildcard patterns.
///
/// A `QueryFilter` is immutable once built and can be reused across any
/// number of decode calls and shared between threads.
///
/// # Example
///
/// ```rust
/// use clp_types::{FilterVerdict, QueryFilter};
///
/// let filter = QueryFilter::builder()
///     .begin(100)
///     .end(200)
///     .add_pattern("*error*")
///     .build()
///     .unwrap();
///
/// assert_eq!(filter.evaluate(50, "Error: disk full"), FilterVerdict::Reject);
/// assert!(matches!(filter.evaluate(150, "Error: disk full"), FilterVerdict::Accept { .. }));
/// assert_eq!(filter.evaluate(250, "Error: disk full"), FilterVerdict::StopScanning);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryFilter {
  begin: Option<i64>,
  end: Option<i64>,
  termination_margin: i64,
  patterns: Vec<WildcardQuery>,
}

impl QueryFilter {
  /// A filter that accepts every record.
  pub fn new() -> Self {
    Self::default()
  }

  pub fn builder() -> QueryFilterBuilder {
    QueryFilterBuilder::default()
  }

  /// Inclusive lower time bound, if any.
  pub fn begin(&self) -> Option<i64> {
    self.begin
  }

  /// Inclusive upper time bound, if any.
  pub fn end(&self) -> Option<i64> {
    self.end
  }

  /// How far past `end` a timestamp must be before scanning stops.
  pub fn termination_margin(&self) -> i64 {
    self.termination_margin
  }

  pub fn patterns(&self) -> &[WildcardQuery] {
    &self.patterns
  }

  pub fn matches_time_range(&self, ts: i64) -> bool {
    self.begin.is_none_or(|begin| ts >= begin) && self.end.is_none_or(|end| ts <= end)
  }

  /// Whether `ts` is far enough past the upper bound that, with
  /// non-decreasing timestamps, no later record can match.
  ///
  /// Only the upper bound is considered; a record below `begin` is merely
  /// rejected.
  pub fn safely_outside_range(&self, ts: i64) -> bool {
    self
      .end
      .is_some_and(|end| ts > end.saturating_add(self.termination_margin))
  }

  /// Try each pattern in order and report the first that matches.
  pub fn find_pattern_match(&self, text: &str) -> PatternMatch<'_> {
    if self.patterns.is_empty() {
      return PatternMatch::Unconstrained;
    }
    self
      .patterns
      .iter()
      .enumerate()
      .find(|(_, query)| query.matches(text))
      .map_or(PatternMatch::NoMatch, |(index, query)| PatternMatch::Matched {
        index,
        query,
      })
  }

  pub fn matches_patterns(&self, text: &str) -> bool {
    self.find_pattern_match(text).is_match()
  }

  /// Classify a record. See [`FilterVerdict`] for the decision order.
  pub fn evaluate(&self, ts: i64, text: &str) -> FilterVerdict {
    if self.safely_outside_range(ts) {
      return FilterVerdict::StopScanning;
    }
    if !self.matches_time_range(ts) {
      return FilterVerdict::Reject;
    }
    match self.find_pattern_match(text) {
      PatternMatch::Unconstrained => FilterVerdict::Accept { pattern: None },
      PatternMatch::Matched { index, .. } => FilterVerdict::Accept {
        pattern: Some(index),
      },
      PatternMatch::NoMatch => FilterVerdict::Reject,
    }
  }
}

/// Builder for [`QueryFilter`].
///
/// Patterns added with [`add_pattern`](Self::add_pattern) take the
/// builder's current case sensitivity (case-insensitive unless
/// [`case_sensitive`](Self::case_sensitive) was called);
/// [`add_wildcard_query`](Self::add_wildcard_query) keeps the query's own.
#[derive(Clone, Debug, Default)]
pub struct QueryFilterBuilder {
  begin: Option<i64>,
  end: Option<i64>,
  termination_margin: i64,
  case_sensitive: bool,
  patterns: Vec<WildcardQuery>,
}

impl QueryFilterBuilder {
  #[must_use]
  pub fn begin(mut self, ts: i64) -> Self {
    self.begin = Some(ts);
    self
  }

  #[must_use]
  pub fn end(mut self, ts: i64) -> Self {
    self.end = Some(ts);
    self
  }

  #[must_use]
  pub fn time_range(self, begin: Option<i64>, end: Option<i64>) -> Self {
    Self { begin, end, ..self }
  }

  #[must_use]
  pub fn termination_margin(mut self, margin_ms: i64) -> Self {
    self.termination_margin = margin_ms;
    self
  }

  /// Set the case sensitivity for patterns added after this call.
  #[must_use]
  pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
    self.case_sensitive = case_sensitive;
    self
  }

  #[must_use]
  pub fn add_pattern(mut self, pattern: impl Into<String>) -> Self {
    let query = WildcardQuery::with_case_sensitivity(pattern, self.case_sensitive);
    self.patterns.push(query);
    self
  }

  #[must_use]
  pub fn add_patterns<I, S>(self, patterns: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    patterns.into_iter().fold(self, Self::add_pattern)
  }

  #[must_use]
  pub fn add_wildcard_query(mut self, query: WildcardQuery) -> Self {
    self.patterns.push(query);
    self
  }

  #[must_use]
  pub fn reset_time_range(mut self) -> Self {
    self.begin = None;
    self.end = None;
    self
  }

  #[must_use]
  pub fn reset_patterns(mut self) -> Self {
    self.patterns.clear();
    self
  }

  /// Finish the filter.
  ///
  /// # Errors
  ///
  /// - [`FilterError::InvalidTimeRange`] if `begin > end`.
  /// - [`FilterError::NegativeMargin`] if the termination margin is negative.
  pub fn build(self) -> Result<QueryFilter, FilterError> {
    if let (Some(begin), Some(end)) = (self.begin, self.end) {
      if begin > end {
        return Err(FilterError::InvalidTimeRange { begin, end });
      }
    }
    if self.termination_margin < 0 {
      return Err(FilterError::NegativeMargin(self.termination_margin));
    }

    Ok(QueryFilter {
      begin: self.begin,
      end: self.end,
      termination_margin: self.termination_margin,
      patterns: self.patterns,
    })
  }
}
