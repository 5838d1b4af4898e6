use chrono::Duration;
use serde::{Deserialize, Serialize};

pub const DEFAULT_COMPLETION_MARGIN_SECS: i64 = 90;
pub const DEFAULT_MAX_CYCLE_ITERATIONS: u32 = 1000;
pub const DEFAULT_DIALECT: &str = "markdown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How old a completion stamp may be, relative to now, and still trigger a reschedule.
    pub completion_margin_secs: i64,
    /// Upper bound on interval steps when catching a `++` schedule up to the completion.
    pub max_cycle_iterations: u32,
    /// Block format the textual grammar applies to.
    pub dialect: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            completion_margin_secs: DEFAULT_COMPLETION_MARGIN_SECS,
            max_cycle_iterations: DEFAULT_MAX_CYCLE_ITERATIONS,
            dialect: DEFAULT_DIALECT.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn completion_margin(&self) -> Duration {
        Duration::try_seconds(self.completion_margin_secs).unwrap_or(Duration::MAX)
    }
}
