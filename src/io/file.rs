use std::path::Path;

use thiserror::Error;

use crate::model::Task;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Save a task list to a JSON file.
pub fn save_tasks(tasks: &[Task], path: &Path) -> Result<(), FileError> {
    let json = serde_json::to_string_pretty(tasks)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Load a task list from a JSON file.
pub fn load_tasks(path: &Path) -> Result<Vec<Task>, FileError> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}
