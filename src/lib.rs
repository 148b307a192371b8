//! Scheduling engine for interactive Gantt timelines.
//!
//! Turns task records into a time-indexed layout, computes the critical
//! path through their dependency network, and supports live, date-accurate
//! editing via drag gestures or keyboard nudges. Rendering, persistence
//! and UI chrome are external collaborators: this crate is a pure
//! computation library, safe to call on every animation frame.
//!
//! - [`model`]: tasks, the visible time window, and field mapping for
//!   records arriving from a configurable store
//! - [`engine`]: dependency graph construction, critical-path analysis,
//!   the drag state machine, connector routing, and the layout facade
//! - [`io`]: CSV import and JSON save/load of task lists

pub mod engine;
pub mod io;
pub mod model;

pub use engine::{
    analyze, begin_drag, commit_drag, jump_to_today, nudge_days, resize_end_days, route,
    update_drag, CpmResult, DateChange, DependencyGraph, DragMode, DragPreview, DragState,
    GanttEngine, GanttSnapshot, LayoutMetrics, PathGeometry, Point, TaskBar, TaskSchedule,
    SLACK_EPSILON,
};
pub use model::{FieldMap, FieldRef, Record, Task, TaskId, TimeWindow, TimelineScale};
