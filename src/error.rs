//! Failure types for the command boundary and the scheduler.

use thiserror::Error;

/// Structural problems with a command line, caught before the scheduler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("wrong argument count or non-integer argument")]
    BadArgs,

    #[error("unknown command")]
    UnknownCommand,
}

impl CommandError {
    pub fn reason(&self) -> &'static str {
        match self {
            CommandError::BadArgs => "bad_args",
            CommandError::UnknownCommand => "unknown_command",
        }
    }
}

/// Semantic failures reported by scheduler operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("queue already exists: {0}")]
    QueueExists(String),

    #[error("queue not found: {0}")]
    QueueNotFound(String),

    #[error("steps {steps} outside 1..={queues}")]
    InvalidSteps { steps: i64, queues: usize },
}

impl ScheduleError {
    pub fn reason(&self) -> &'static str {
        match self {
            ScheduleError::QueueExists(_) => "queue_exists",
            ScheduleError::QueueNotFound(_) => "queue_not_found",
            ScheduleError::InvalidSteps { .. } => "invalid_steps",
        }
    }
}

/// Requests the shop turns away. Not errors: they pair with a customer notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    UnknownItem,
    Full,
}

impl Rejection {
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::UnknownItem => "unknown_item",
            Rejection::Full => "full",
        }
    }

    /// Human-readable notice printed alongside the structured log line.
    pub fn notice(&self) -> &'static str {
        match self {
            Rejection::UnknownItem => "Sorry, we don't serve that.",
            Rejection::Full => "Sorry, we're at capacity.",
        }
    }
}
