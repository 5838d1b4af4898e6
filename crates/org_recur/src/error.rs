use thiserror::Error;

pub type Result<T> = std::result::Result<T, RecurError>;

/// Grammar and calendar failures raised while handling a single task.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecurError {
    #[error("invalid date format: `{0}`")]
    InvalidFormat(String),

    #[error("invalid interval: `{0}`")]
    InvalidInterval(String),

    #[error("invalid interval unit `{0}`")]
    InvalidIntervalUnit(char),

    #[error("date arithmetic left the representable range")]
    DateOutOfRange,
}
