use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque task identifier.
///
/// Dependency cells arrive from the record store as plain strings, so the
/// id is string-backed; `generate` is used when the engine itself creates
/// a task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A single task on the timeline.
///
/// Dates are optional: records frequently arrive half-filled, and a task
/// without a parseable start simply drops out of layout and graph
/// computation instead of failing anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Predecessor task ids. References to unknown ids are ignored.
    #[serde(default)]
    pub dependencies: Vec<TaskId>,
    /// Display attribute, not consumed by the algorithmic core.
    #[serde(default)]
    pub status: Option<String>,
    /// Display attribute from 0.0 (not started) to 1.0 (complete).
    #[serde(default)]
    pub progress: Option<f64>,
}

impl Task {
    /// Create a new task with both dates set.
    pub fn new(title: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            id: TaskId::generate(),
            title: title.into(),
            start: Some(start),
            end: Some(end),
            dependencies: Vec::new(),
            status: None,
            progress: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<TaskId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_dependencies(mut self, deps: Vec<TaskId>) -> Self {
        self.dependencies = deps;
        self
    }

    /// The effective end date: the stored one, or `start + 1 day` when absent.
    pub fn end_or_default(&self) -> Option<NaiveDate> {
        match (self.start, self.end) {
            (_, Some(end)) => Some(end),
            (Some(start), None) => Some(start + Duration::days(1)),
            (None, None) => None,
        }
    }

    /// Resolved `(start, end)` span, or `None` when the start is missing.
    pub fn resolved_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = self.start?;
        let end = self.end_or_default()?;
        Some((start, end))
    }

    /// Duration in whole days, floored at 1. `None` when dates are unresolvable.
    pub fn duration_days(&self) -> Option<i64> {
        let (start, end) = self.resolved_span()?;
        Some((end - start).num_days().max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_duration_floor() {
        // start == end still counts as one day, never zero
        let task = Task::new("T", date(2026, 3, 5), date(2026, 3, 5));
        assert_eq!(task.duration_days(), Some(1));
    }

    #[test]
    fn test_duration_whole_days() {
        let task = Task::new("T", date(2026, 3, 5), date(2026, 3, 9));
        assert_eq!(task.duration_days(), Some(4));
    }

    #[test]
    fn test_end_defaults_to_next_day() {
        let mut task = Task::new("T", date(2026, 3, 5), date(2026, 3, 9));
        task.end = None;
        assert_eq!(task.end_or_default(), Some(date(2026, 3, 6)));
        assert_eq!(task.duration_days(), Some(1));
    }

    #[test]
    fn test_missing_start_is_unresolvable() {
        let mut task = Task::new("T", date(2026, 3, 5), date(2026, 3, 9));
        task.start = None;
        assert_eq!(task.resolved_span(), None);
        assert_eq!(task.duration_days(), None);
    }

    #[test]
    fn test_task_id_roundtrip() {
        let id = TaskId::new("rec42");
        assert_eq!(id.to_string(), "rec42");
        assert_eq!(TaskId::from("rec42"), id);
    }
}
