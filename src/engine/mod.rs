pub mod cpm;
pub mod drag;
pub mod graph;
pub mod layout;
pub mod routing;

pub use cpm::{analyze, CpmResult, TaskSchedule, SLACK_EPSILON};
pub use drag::{
    begin_drag, commit_drag, jump_to_today, nudge_days, resize_end_days, update_drag, DateChange,
    DragMode, DragPreview, DragState,
};
pub use graph::DependencyGraph;
pub use layout::{GanttEngine, GanttSnapshot, LayoutMetrics, TaskBar};
pub use routing::{route, PathGeometry, Point};
