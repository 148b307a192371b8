use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Task, TaskId};

/// Predecessor/successor adjacency over the currently visible task set.
///
/// Ephemeral: rebuilt whenever the task set, visible window, or the
/// dependency-field mapping changes. Construction never fails; dangling
/// references are dropped and tasks without resolvable dates are kept out
/// of `valid` so they never influence critical-path results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DependencyGraph {
    pub predecessors: HashMap<TaskId, Vec<TaskId>>,
    pub successors: HashMap<TaskId, Vec<TaskId>>,
    /// Per-task duration in whole days (floored at 1).
    pub durations: HashMap<TaskId, i64>,
    /// Tasks with both dates resolvable; the analyzer only operates on these.
    pub valid: HashSet<TaskId>,
}

impl DependencyGraph {
    /// Build the graph in O(tasks + edges): one pass to register nodes and
    /// durations, a second to resolve edges against the registered set.
    ///
    /// When the caller has no dependency field configured,
    /// `dependencies_enabled` is false and the graph carries no edges;
    /// critical-path analysis is then inapplicable and every valid task is
    /// trivially its own chain.
    pub fn build(tasks: &[Task], dependencies_enabled: bool) -> Self {
        let mut graph = Self::default();

        for task in tasks {
            graph
                .durations
                .insert(task.id.clone(), task.duration_days().unwrap_or(1));
            graph.predecessors.insert(task.id.clone(), Vec::new());
            graph.successors.insert(task.id.clone(), Vec::new());
            if task.resolved_span().is_some() {
                graph.valid.insert(task.id.clone());
            }
        }

        if !dependencies_enabled {
            return graph;
        }

        let known: HashSet<&TaskId> = tasks.iter().map(|t| &t.id).collect();
        let mut dropped = 0usize;

        for task in tasks {
            for dep in &task.dependencies {
                if dep == &task.id || !known.contains(dep) {
                    dropped += 1;
                    continue;
                }
                let preds = graph.predecessors.entry(task.id.clone()).or_default();
                if preds.contains(dep) {
                    continue;
                }
                preds.push(dep.clone());
                graph
                    .successors
                    .entry(dep.clone())
                    .or_default()
                    .push(task.id.clone());
            }
        }

        if dropped > 0 {
            debug!(dropped, "dropped unresolvable dependency references");
        }
        graph
    }

    pub fn duration(&self, id: &TaskId) -> i64 {
        self.durations.get(id).copied().unwrap_or(1)
    }

    pub fn predecessors_of(&self, id: &TaskId) -> &[TaskId] {
        self.predecessors.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn successors_of(&self, id: &TaskId) -> &[TaskId] {
        self.successors.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_edges(&self) -> bool {
        self.predecessors.values().any(|p| !p.is_empty())
    }
}
