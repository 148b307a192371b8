use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::engine::drag::DragPreview;
use crate::engine::layout::{effective_span, LayoutMetrics};
use crate::model::{Task, TaskId, TimeWindow};

/// Horizontal inset from the bar edge where a connector attaches.
const EDGE_INSET: f32 = 3.0;
/// Length of the horizontal stub leaving the predecessor before the
/// vertical run.
const ELBOW_STUB: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An orthogonal polyline connecting two task bars. Consecutive points
/// alternate horizontal and vertical segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathGeometry {
    pub points: Vec<Point>,
}

/// Route a dependency connector from `predecessor` to `successor`.
///
/// The route leaves the predecessor bar's right edge at its row center,
/// runs a short stub right, drops (or rises) to the successor's row, and
/// runs to the successor bar's left edge. It never visits a third row, and
/// identical inputs always produce identical geometry.
///
/// Returns `None` when either task's dates cannot be resolved or either
/// task has no row (filtered out of view). That is a normal outcome, not
/// an error.
pub fn route(
    window: &TimeWindow,
    predecessor: &Task,
    successor: &Task,
    rows: &HashMap<TaskId, usize>,
    metrics: &LayoutMetrics,
    preview: Option<&DragPreview>,
) -> Option<PathGeometry> {
    let (_, pred_end) = effective_span(predecessor, preview)?;
    let (succ_start, _) = effective_span(successor, preview)?;
    let pred_row = *rows.get(&predecessor.id)?;
    let succ_row = *rows.get(&successor.id)?;

    let from = Point::new(
        window.date_to_x(pred_end, metrics.column_width) - EDGE_INSET,
        metrics.row_center_y(pred_row),
    );
    let to = Point::new(
        window.date_to_x(succ_start, metrics.column_width) + EDGE_INSET,
        metrics.row_center_y(succ_row),
    );
    let elbow_x = from.x + ELBOW_STUB;

    Some(PathGeometry {
        points: vec![
            from,
            Point::new(elbow_x, from.y),
            Point::new(elbow_x, to.y),
            to,
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TimelineScale;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup() -> (TimeWindow, Task, Task, HashMap<TaskId, usize>, LayoutMetrics) {
        let window = TimeWindow::resolve(date(2026, 6, 15), TimelineScale::Day);
        let pred = Task::new("A", date(2026, 6, 10), date(2026, 6, 12)).with_id("a");
        let succ = Task::new("B", date(2026, 6, 12), date(2026, 6, 14)).with_id("b");
        let rows = HashMap::from([("a".into(), 0usize), ("b".into(), 1usize)]);
        (window, pred, succ, rows, LayoutMetrics::default())
    }

    #[test]
    fn test_route_endpoints_and_shape() {
        let (window, pred, succ, rows, metrics) = setup();
        let path = route(&window, &pred, &succ, &rows, &metrics, None).unwrap();

        assert_eq!(path.points.len(), 4);
        let from = path.points[0];
        let to = path.points[3];
        assert_eq!(
            from.x,
            window.date_to_x(date(2026, 6, 12), metrics.column_width) - 3.0
        );
        assert_eq!(from.y, metrics.row_center_y(0));
        assert_eq!(to.y, metrics.row_center_y(1));
        // every segment is axis-aligned
        for pair in path.points.windows(2) {
            assert!(pair[0].x == pair[1].x || pair[0].y == pair[1].y);
        }
        // the vertical run stays between the two row levels
        assert!(path.points[1].y.min(path.points[2].y) >= metrics.row_center_y(0));
        assert!(path.points[1].y.max(path.points[2].y) <= metrics.row_center_y(1));
    }

    #[test]
    fn test_route_is_deterministic() {
        let (window, pred, succ, rows, metrics) = setup();
        let preview = DragPreview {
            task: "b".into(),
            start: date(2026, 6, 18),
            end: date(2026, 6, 20),
        };
        let first = route(&window, &pred, &succ, &rows, &metrics, Some(&preview));
        let second = route(&window, &pred, &succ, &rows, &metrics, Some(&preview));
        assert_eq!(first, second);
    }

    #[test]
    fn test_preview_moves_the_attachment_point() {
        let (window, pred, succ, rows, metrics) = setup();
        let preview = DragPreview {
            task: "b".into(),
            start: date(2026, 6, 18),
            end: date(2026, 6, 20),
        };
        let plain = route(&window, &pred, &succ, &rows, &metrics, None).unwrap();
        let live = route(&window, &pred, &succ, &rows, &metrics, Some(&preview)).unwrap();
        assert!(live.points[3].x > plain.points[3].x);
        // the predecessor side is unaffected
        assert_eq!(live.points[0], plain.points[0]);
    }

    #[test]
    fn test_missing_row_or_dates_yields_none() {
        let (window, pred, mut succ, mut rows, metrics) = setup();
        rows.remove(&TaskId::from("b"));
        assert!(route(&window, &pred, &succ, &rows, &metrics, None).is_none());

        rows.insert("b".into(), 1);
        succ.start = None;
        succ.end = None;
        assert!(route(&window, &pred, &succ, &rows, &metrics, None).is_none());
    }
}
