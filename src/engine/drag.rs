use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::{Task, TaskId};

/// Which part of the bar the pointer grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragMode {
    /// Shift the whole bar, preserving its duration.
    Move,
    /// Drag the left edge; the end date stays put.
    ResizeStart,
    /// Drag the right edge; the start date stays put.
    ResizeEnd,
}

/// The drag gesture, passed explicitly through the begin/update/commit
/// lifecycle so the engine stays testable without an event loop.
///
/// Created on gesture start, consulted on every pointer move, consumed on
/// gesture end. Cancellation is simply dropping the state without calling
/// [`commit_drag`]; the task's persisted dates are then untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DragState {
    Idle,
    Dragging {
        task: TaskId,
        mode: DragMode,
        /// Dates captured at gesture start; all deltas are relative to these.
        origin_start: NaiveDate,
        origin_end: NaiveDate,
        /// Pointer x at gesture start.
        anchor_x: f32,
    },
}

/// Tentative dates for live feedback during an in-progress drag.
/// Never written to the task store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragPreview {
    pub task: TaskId,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// A committed date change, to be pushed to the record store by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateChange {
    pub task: TaskId,
    pub new_start: NaiveDate,
    pub new_end: NaiveDate,
}

/// Capture a gesture against the task's current dates.
///
/// Returns `Idle` for a task without resolvable dates: there is no bar to
/// grab, so the gesture never starts.
pub fn begin_drag(task: &Task, mode: DragMode, pointer_x: f32) -> DragState {
    match task.resolved_span() {
        Some((start, end)) => DragState::Dragging {
            task: task.id.clone(),
            mode,
            origin_start: start,
            origin_end: end,
            anchor_x: pointer_x,
        },
        None => DragState::Idle,
    }
}

/// Preview dates for the current pointer position. `None` while idle.
pub fn update_drag(state: &DragState, pointer_x: f32, column_width: f32) -> Option<DragPreview> {
    let DragState::Dragging {
        task,
        mode,
        origin_start,
        origin_end,
        anchor_x,
    } = state
    else {
        return None;
    };

    let delta = delta_days(pointer_x - anchor_x, column_width);
    let (start, end) = apply_delta(*mode, *origin_start, *origin_end, delta);
    Some(DragPreview {
        task: task.clone(),
        start,
        end,
    })
}

/// Consume the gesture and return the final dates, or `None` when the net
/// delta is zero (nothing to persist, distinct from failure).
pub fn commit_drag(state: DragState, pointer_x: f32, column_width: f32) -> Option<DateChange> {
    let DragState::Dragging {
        task,
        mode,
        origin_start,
        origin_end,
        anchor_x,
    } = state
    else {
        return None;
    };

    let delta = delta_days(pointer_x - anchor_x, column_width);
    if delta == 0 {
        return None;
    }
    let (new_start, new_end) = apply_delta(mode, origin_start, origin_end, delta);
    // The clamp can collapse a nonzero delta back onto the origin dates
    // (resizing the start of a 1-day task, say); that is just as much a
    // no-op as delta == 0 and must not reach the store.
    if (new_start, new_end) == (origin_start, origin_end) {
        return None;
    }
    Some(DateChange {
        task,
        new_start,
        new_end,
    })
}

/// Move the whole task by a day count, preserving duration.
/// Keyboard arrows call this with ±1.
pub fn nudge_days(task: &Task, days: i64) -> Option<DateChange> {
    if days == 0 {
        return None;
    }
    let (start, end) = task.resolved_span()?;
    let (new_start, new_end) = apply_delta(DragMode::Move, start, end, days);
    Some(DateChange {
        task: task.id.clone(),
        new_start,
        new_end,
    })
}

/// Grow or shrink the end date by a day count, with the same clamp as the
/// pointer path. Vertical keyboard arrows call this with ±1.
pub fn resize_end_days(task: &Task, days: i64) -> Option<DateChange> {
    if days == 0 {
        return None;
    }
    let (start, end) = task.resolved_span()?;
    let (new_start, new_end) = apply_delta(DragMode::ResizeEnd, start, end, days);
    if (new_start, new_end) == (start, end) {
        return None;
    }
    Some(DateChange {
        task: task.id.clone(),
        new_start,
        new_end,
    })
}

/// Jump the task so it starts today, preserving its duration.
pub fn jump_to_today(task: &Task, today: NaiveDate) -> Option<DateChange> {
    let (start, _) = task.resolved_span()?;
    nudge_days(task, (today - start).num_days())
}

/// Pixel delta to whole days, rounding to the nearest column.
fn delta_days(delta_x: f32, column_width: f32) -> i64 {
    if column_width <= 0.0 {
        return 0;
    }
    (delta_x / column_width).round() as i64
}

/// The single piece of date arithmetic behind both the pointer and the
/// keyboard paths. `end > start` holds for every output.
fn apply_delta(
    mode: DragMode,
    origin_start: NaiveDate,
    origin_end: NaiveDate,
    delta: i64,
) -> (NaiveDate, NaiveDate) {
    match mode {
        DragMode::Move => (
            origin_start + Duration::days(delta),
            origin_end + Duration::days(delta),
        ),
        DragMode::ResizeStart => {
            let mut start = origin_start + Duration::days(delta);
            if start >= origin_end {
                start = origin_end - Duration::days(1);
            }
            (start, origin_end)
        }
        DragMode::ResizeEnd => {
            let mut end = origin_end + Duration::days(delta);
            if end <= origin_start {
                end = origin_start + Duration::days(1);
            }
            (origin_start, end)
        }
    }
}
