use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::cpm::{self, CpmResult};
use crate::engine::drag::DragPreview;
use crate::engine::graph::DependencyGraph;
use crate::engine::routing::{self, PathGeometry};
use crate::model::{Task, TaskId, TimeWindow};

/// Display densities the pixel math is parameterized on. The defaults
/// mirror a comfortable desktop layout; callers override `column_width`
/// to zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutMetrics {
    /// Pixels per day.
    pub column_width: f32,
    pub row_height: f32,
    pub row_gap: f32,
    pub header_height: f32,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            column_width: 18.0,
            row_height: 30.0,
            row_gap: 2.0,
            header_height: 44.0,
        }
    }
}

impl LayoutMetrics {
    /// Vertical center of a row's bar.
    pub fn row_center_y(&self, row: usize) -> f32 {
        self.header_height
            + row as f32 * (self.row_height + self.row_gap)
            + self.row_gap
            + self.row_height / 2.0
    }
}

/// One task bar in pixel coordinates relative to the current window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskBar {
    pub task: TaskId,
    pub row: usize,
    pub x_start: f32,
    pub x_end: f32,
    /// Zero-slack membership from the critical-path analysis.
    pub critical: bool,
}

/// Everything rendering pulls per frame: bars, dependency connectors, and
/// the analysis they were derived from.
#[derive(Debug, Clone, Default)]
pub struct GanttSnapshot {
    pub bars: Vec<TaskBar>,
    /// `(predecessor, successor, geometry)` per resolvable dependency edge.
    pub edges: Vec<(TaskId, TaskId, PathGeometry)>,
    pub cpm: CpmResult,
    /// Row index per visible task, as handed to the router.
    pub rows: HashMap<TaskId, usize>,
}

/// Facade tying the window, graph, analyzer, and router together.
///
/// Stateless apart from its metrics; a snapshot is a pure function of the
/// inputs and cheap enough to recompute on every animation frame during a
/// drag. The graph is only ever built from the complete task set passed
/// in, never from a partial view.
#[derive(Debug, Clone, Default)]
pub struct GanttEngine {
    pub metrics: LayoutMetrics,
}

impl GanttEngine {
    pub fn new(metrics: LayoutMetrics) -> Self {
        Self { metrics }
    }

    /// Compute the full render state for one frame.
    ///
    /// `dependencies_enabled` reflects whether a dependency field is
    /// configured at all; when it is not, the snapshot carries no edges
    /// and an empty analysis, and no bar is marked critical.
    /// Tasks without a parseable start are excluded from layout (they get
    /// no row and no bar). An in-flight drag is reflected by passing its
    /// preview: the dragged task's bar and every connector touching it
    /// follow the preview dates while the stored dates stay untouched.
    pub fn snapshot(
        &self,
        tasks: &[Task],
        window: &TimeWindow,
        dependencies_enabled: bool,
        preview: Option<&DragPreview>,
    ) -> GanttSnapshot {
        let graph = DependencyGraph::build(tasks, dependencies_enabled);
        // Without a dependency relation configured, critical-path analysis
        // is inapplicable: an empty result leaves every bar un-flagged
        // instead of marking the longest chain of an edge-free graph.
        let cpm = if dependencies_enabled {
            cpm::analyze(&graph)
        } else {
            CpmResult::default()
        };
        debug!(
            tasks = tasks.len(),
            valid = graph.valid.len(),
            critical = cpm.critical.len(),
            "recomputed schedule snapshot"
        );

        let mut rows: HashMap<TaskId, usize> = HashMap::new();
        let mut bars = Vec::new();
        for task in tasks {
            let Some((start, end)) = effective_span(task, preview) else {
                continue;
            };
            let row = rows.len();
            rows.insert(task.id.clone(), row);
            bars.push(TaskBar {
                task: task.id.clone(),
                row,
                x_start: window.date_to_x(start, self.metrics.column_width),
                x_end: window.date_to_x(end, self.metrics.column_width),
                critical: cpm.is_critical(&task.id),
            });
        }

        let by_id: HashMap<&TaskId, &Task> = tasks.iter().map(|t| (&t.id, t)).collect();
        let mut edges = Vec::new();
        if dependencies_enabled {
            for task in tasks {
                for dep in &task.dependencies {
                    let Some(pred) = by_id.get(dep) else { continue };
                    if let Some(path) =
                        routing::route(window, pred, task, &rows, &self.metrics, preview)
                    {
                        edges.push((dep.clone(), task.id.clone(), path));
                    }
                }
            }
        }

        GanttSnapshot {
            bars,
            edges,
            cpm,
            rows,
        }
    }
}

/// A task's `(start, end)` with any live drag preview applied.
pub(crate) fn effective_span(
    task: &Task,
    preview: Option<&DragPreview>,
) -> Option<(chrono::NaiveDate, chrono::NaiveDate)> {
    match preview {
        Some(p) if p.task == task.id => Some((p.start, p.end)),
        _ => task.resolved_span(),
    }
}
