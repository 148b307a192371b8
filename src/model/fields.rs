use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::task::{Task, TaskId};

/// Reference to a field of the backing record store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldRef(String);

impl FieldRef {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn key(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldRef {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A raw record from the store: an id plus arbitrary field values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: TaskId,
    pub fields: HashMap<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<TaskId>) -> Self {
        Self {
            id: id.into(),
            fields: HashMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }
}

/// Maps record fields to the roles the engine understands.
///
/// The scheduling core never touches this directly; it only ever sees
/// already-resolved `Task` values, so callers are free to substitute any
/// mapping for the auto-detection heuristic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldMap {
    pub start: Option<FieldRef>,
    pub end: Option<FieldRef>,
    pub title: Option<FieldRef>,
    pub status: Option<FieldRef>,
    pub progress: Option<FieldRef>,
    pub dependency: Option<FieldRef>,
}

impl FieldMap {
    /// Guess a mapping from the records themselves: the first field holding
    /// date-parsable values becomes the start, the second the end; the first
    /// non-date text field becomes the title. Status, progress and the
    /// dependency relation are matched by header name.
    ///
    /// Field keys are scanned in sorted order so detection does not depend
    /// on hash-map iteration.
    pub fn auto_detect(records: &[Record]) -> Self {
        let keys: BTreeSet<&str> = records
            .iter()
            .flat_map(|r| r.fields.keys().map(String::as_str))
            .collect();

        let mut map = Self::default();
        for key in keys {
            let holds_date = records
                .iter()
                .filter_map(|r| r.fields.get(key))
                .any(|v| date_value(v).is_some());

            if holds_date {
                if map.start.is_none() {
                    map.start = Some(FieldRef::new(key));
                } else if map.end.is_none() {
                    map.end = Some(FieldRef::new(key));
                }
                continue;
            }

            match normalize_key(key).as_str() {
                "status" | "state" | "stage" => {
                    map.status.get_or_insert_with(|| FieldRef::new(key));
                }
                "progress" | "percentdone" | "completion" => {
                    map.progress.get_or_insert_with(|| FieldRef::new(key));
                }
                "dependencies" | "dependency" | "dependson" | "predecessors" | "predecessor"
                | "blockedby" => {
                    map.dependency.get_or_insert_with(|| FieldRef::new(key));
                }
                _ => {
                    let textual = records
                        .iter()
                        .filter_map(|r| r.fields.get(key))
                        .any(|v| v.is_string());
                    if textual && map.title.is_none() {
                        map.title = Some(FieldRef::new(key));
                    }
                }
            }
        }

        debug!(?map, "auto-detected field mapping");
        map
    }

    /// Resolve one record into a `Task`. Unparsable dates stay `None`; the
    /// task then drops out of layout and graph work downstream rather than
    /// erroring here.
    pub fn resolve_task(&self, record: &Record) -> Task {
        let get = |r: &Option<FieldRef>| {
            r.as_ref()
                .and_then(|f| record.fields.get(f.key()))
                .cloned()
        };

        Task {
            id: record.id.clone(),
            title: get(&self.title)
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default(),
            start: get(&self.start).as_ref().and_then(date_value),
            end: get(&self.end).as_ref().and_then(date_value),
            dependencies: get(&self.dependency)
                .map(|v| dependency_ids(&v))
                .unwrap_or_default(),
            status: get(&self.status).and_then(|v| v.as_str().map(str::to_string)),
            progress: get(&self.progress).and_then(|v| v.as_f64()),
        }
    }

    /// Resolve a whole record set, preserving order.
    pub fn resolve_all(&self, records: &[Record]) -> Vec<Task> {
        records.iter().map(|r| self.resolve_task(r)).collect()
    }
}

/// Try parsing a date string with several common formats.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for fmt in &[
        "%Y-%m-%d",
        "%d/%m/%Y",
        "%m/%d/%Y",
        "%d-%m-%Y",
        "%d.%m.%Y",
        "%Y/%m/%d",
        "%m-%d-%Y",
    ] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

fn date_value(value: &Value) -> Option<NaiveDate> {
    value.as_str().and_then(parse_date)
}

/// Normalize a dependency cell: the store may hand us a single scalar or a
/// list, so both shapes collapse to a flat id list.
fn dependency_ids(value: &Value) -> Vec<TaskId> {
    match value {
        Value::Array(items) => items.iter().flat_map(dependency_ids).collect(),
        Value::String(s) if !s.trim().is_empty() => vec![TaskId::new(s.trim())],
        Value::Number(n) => vec![TaskId::new(n.to_string())],
        _ => Vec::new(),
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace([' ', '-', '_'], "")
}
