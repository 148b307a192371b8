use std::path::Path;

use thiserror::Error;
use tracing::warn;

use crate::model::fields::parse_date;
use crate::model::{Task, TaskId};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV is missing required columns (found headers: {found:?}); need task name, start date, end date")]
    MissingColumns { found: Vec<String> },
    #[error("no valid tasks found in CSV ({skipped} rows skipped)")]
    Empty { skipped: usize },
}

/// Map a status string to a progress value (0.0 – 1.0).
fn status_to_progress(status: &str) -> f64 {
    match status.trim().to_lowercase().as_str() {
        "finished" | "done" | "complete" | "completed" => 1.0,
        "in progress" | "in-progress" | "active" | "started" => 0.5,
        "released" | "planned" => 0.25,
        _ => 0.0,
    }
}

/// Detect delimiter by checking the first line for common separators.
fn detect_delimiter(first_line: &str) -> u8 {
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    let tabs = first_line.matches('\t').count();

    if semicolons >= commas && semicolons >= tabs {
        b';'
    } else if tabs >= commas {
        b'\t'
    } else {
        b','
    }
}

/// Normalize a header string to a canonical column key.
fn normalize_header(h: &str) -> String {
    h.trim().to_lowercase().replace([' ', '-', '_'], "")
}

/// Map a normalized header to our column index:
///   0 = name, 1 = start, 2 = end, 3 = status, 4 = progress, 5 = dependencies
fn header_to_col(normalized: &str) -> Option<usize> {
    match normalized {
        "name" | "task" | "taskname" | "label" | "title" | "activity" => Some(0),

        "start" | "startdate" | "from" | "begin" | "begindate" => Some(1),

        "end" | "enddate" | "to" | "finish" | "finishdate" | "due" | "duedate" => Some(2),

        "status" | "state" | "stage" => Some(3),

        "progress" | "percentdone" | "completion" => Some(4),

        "dependencies" | "dependency" | "dependson" | "predecessors" | "predecessor"
        | "blockedby" => Some(5),

        _ => None,
    }
}

/// Import tasks from a CSV file.
///
/// Auto-detects delimiter (comma, semicolon, tab) and matches column
/// headers flexibly (e.g. "Task Name", "Start Date", "Depends On").
/// Dependency cells hold task names or ids separated by `,`, `;` or `|`;
/// they are resolved against the other rows in a second pass, and
/// references that match nothing are dropped with a warning. Returns
/// `(tasks, skipped_count)` on success.
pub fn import_csv(path: &Path) -> Result<(Vec<Task>, usize), ImportError> {
    let content = std::fs::read_to_string(path)?;
    import_csv_str(&content)
}

/// Import from already-loaded CSV text. See [`import_csv`].
pub fn import_csv_str(content: &str) -> Result<(Vec<Task>, usize), ImportError> {
    let first_line = content.lines().next().unwrap_or("");
    let delimiter = detect_delimiter(first_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let col_map: Vec<Option<usize>> = headers
        .iter()
        .map(|h| header_to_col(&normalize_header(h)))
        .collect();

    let has_name = col_map.iter().any(|c| *c == Some(0));
    let has_start = col_map.iter().any(|c| *c == Some(1));
    let has_end = col_map.iter().any(|c| *c == Some(2));
    if !has_name || !has_start || !has_end {
        return Err(ImportError::MissingColumns {
            found: headers.iter().map(str::to_string).collect(),
        });
    }

    // Accumulate (task, raw dependency cell) pairs; resolve references in a
    // second pass once every row has an id.
    let mut tasks: Vec<Task> = Vec::new();
    let mut raw_deps: Vec<Vec<String>> = Vec::new();
    let mut skipped = 0usize;

    for (i, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(row = i + 2, error = %e, "skipping malformed CSV row");
                skipped += 1;
                continue;
            }
        };

        let mut name_val = None;
        let mut start_val = None;
        let mut end_val = None;
        let mut status_val = None;
        let mut progress_val = None;
        let mut deps_val: Option<String> = None;

        for (col_idx, field) in record.iter().enumerate() {
            if col_idx < col_map.len() {
                match col_map[col_idx] {
                    Some(0) => name_val = Some(field.trim().to_string()),
                    Some(1) => start_val = Some(field.trim().to_string()),
                    Some(2) => end_val = Some(field.trim().to_string()),
                    Some(3) => status_val = Some(field.trim().to_string()),
                    Some(4) => progress_val = Some(field.trim().to_string()),
                    Some(5) => deps_val = Some(field.trim().to_string()),
                    _ => {}
                }
            }
        }

        let name = match name_val {
            Some(n) if !n.is_empty() => n,
            _ => {
                skipped += 1;
                continue;
            }
        };

        // Dates are optional here, unlike the name: the engine tolerates
        // dateless tasks by keeping them out of layout.
        let start = start_val.as_deref().and_then(parse_date);
        let end = end_val.as_deref().and_then(parse_date);

        let progress = progress_val
            .as_deref()
            .and_then(|s| s.trim_end_matches('%').trim().parse::<f64>().ok())
            .map(|p| if p > 1.0 { p / 100.0 } else { p })
            .or_else(|| status_val.as_deref().map(status_to_progress));

        let mut task = Task {
            id: TaskId::generate(),
            title: name,
            start,
            end,
            dependencies: Vec::new(),
            status: status_val.filter(|s| !s.is_empty()),
            progress,
        };
        if let (Some(s), Some(e)) = (task.start, task.end) {
            if e < s {
                task.end = Some(s);
            }
        }

        raw_deps.push(
            deps_val
                .map(|cell| {
                    cell.split([',', ';', '|'])
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        );
        tasks.push(task);
    }

    if tasks.is_empty() {
        return Err(ImportError::Empty { skipped });
    }

    // Second pass: resolve dependency references by name (case-insensitive)
    // or by id against the freshly parsed rows.
    let name_to_id: std::collections::HashMap<String, TaskId> = tasks
        .iter()
        .map(|t| (t.title.to_lowercase(), t.id.clone()))
        .collect();
    let ids: std::collections::HashSet<TaskId> =
        tasks.iter().map(|t| t.id.clone()).collect();

    for (task, refs) in tasks.iter_mut().zip(raw_deps.iter()) {
        for r in refs {
            let resolved = name_to_id
                .get(&r.to_lowercase())
                .cloned()
                .or_else(|| {
                    let as_id = TaskId::new(r.as_str());
                    ids.contains(&as_id).then_some(as_id)
                });
            match resolved {
                Some(id) if id != task.id => task.dependencies.push(id),
                Some(_) => {}
                None => warn!(reference = %r, task = %task.title, "dependency not found"),
            }
        }
    }

    Ok((tasks, skipped))
}
