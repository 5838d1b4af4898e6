pub mod app;

pub use crate::app::{replay, run, AppConfig, JsonLinesHost};
