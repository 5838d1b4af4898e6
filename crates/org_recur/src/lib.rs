pub mod annotation;
pub mod block;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod interval;
pub mod recurrence;
pub mod rewrite;
mod scan;
pub mod timestamp;
pub mod transition;

pub use crate::block::{ChangeBatch, ChangeRecord, TaskBlock};
pub use crate::config::EngineConfig;
pub use crate::engine::RepeatEngine;
pub use crate::error::{RecurError, Result};
pub use crate::host::{Host, HostAction, RecordingHost};
pub use crate::interval::{Interval, IntervalMode, IntervalUnit};
pub use crate::timestamp::OrgDate;
