//! Solution analysis.
//!
//! Plant-level indicators of a schedule, used to present a solution next
//! to its fitness: line utilization, achieved forecast and raw-material
//! consumption.

mod kpi;

pub use kpi::{MaterialUsage, ScheduleKpi};
