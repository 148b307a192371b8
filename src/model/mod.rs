pub mod fields;
pub mod task;
pub mod timeline;

pub use fields::{FieldMap, FieldRef, Record};
pub use task::{Task, TaskId};
pub use timeline::{TimeWindow, TimelineScale};
