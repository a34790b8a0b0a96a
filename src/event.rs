//! Structured log entries produced by every command.

use std::fmt;

use crate::error::{CommandError, Rejection, ScheduleError};
use crate::types::{QueueId, Work};

/// Clock value attached to a log entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timestamp {
    At(Work),
    /// Printed as `?`; used for boundary errors raised before the scheduler is consulted.
    Unresolved,
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::At(time) => write!(f, "{time}"),
            Timestamp::Unresolved => f.write_str("?"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Create { queue: QueueId },
    Enqueue { queue: QueueId, task: String, remaining: Work },
    Reject { queue: QueueId, reason: Rejection },
    Skip { queue: QueueId },
    Run { queue: QueueId },
    Work { queue: QueueId, task: String, done: Work },
    Finish { queue: QueueId, task: String },
    Error { reason: &'static str },
}

/// One `time=<t> event=<name> ...` line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub time: Timestamp,
    pub event: Event,
}

impl LogEntry {
    pub fn at(time: Work, event: Event) -> Self {
        Self {
            time: Timestamp::At(time),
            event,
        }
    }

    pub fn schedule_error(time: Work, err: &ScheduleError) -> Self {
        Self::at(time, Event::Error { reason: err.reason() })
    }

    pub fn command_error(err: CommandError) -> Self {
        Self {
            time: Timestamp::Unresolved,
            event: Event::Error { reason: err.reason() },
        }
    }

    /// Out-of-band notice that accompanies this entry, if any.
    pub fn notice(&self) -> Option<&'static str> {
        match &self.event {
            Event::Reject { reason, .. } => Some(reason.notice()),
            _ => None,
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "time={} event=", self.time)?;
        match &self.event {
            Event::Create { queue } => write!(f, "create queue={queue}"),
            Event::Enqueue {
                queue,
                task,
                remaining,
            } => write!(f, "enqueue queue={queue} task={task} remaining={remaining}"),
            Event::Reject { queue, reason } => {
                write!(f, "reject queue={queue} reason={}", reason.reason())
            }
            Event::Skip { queue } => write!(f, "skip queue={queue}"),
            Event::Run { queue } => write!(f, "run queue={queue}"),
            Event::Work { queue, task, done } => {
                write!(f, "work queue={queue} task={task} done={done}")
            }
            Event::Finish { queue, task } => write!(f, "finish queue={queue} task={task}"),
            Event::Error { reason } => write!(f, "error reason={reason}"),
        }
    }
}
