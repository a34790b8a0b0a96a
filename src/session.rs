//! Command dispatch: argument checking, scheduler calls, and transcript output.

use std::io::{self, BufRead, Write};
use std::num::{IntErrorKind, NonZeroU64, NonZeroUsize};

use tracing::{debug, info};

use crate::error::CommandError;
use crate::event::LogEntry;
use crate::parser::{ParsedCommand, parse_command};
use crate::scheduler::Scheduler;

/// Printed when a blank line ends the session.
pub const FAREWELL: &str = "Break time!";

/// Parse a whole number, clamping values too large for the type to its bounds.
///
/// Out-of-range counts are still integers; range checks belong to the scheduler.
fn parse_saturating<T>(raw: &str, min: T, max: T) -> Result<T, CommandError>
where
    T: std::str::FromStr<Err = std::num::ParseIntError>,
{
    match raw.parse::<T>() {
        Ok(value) => Ok(value),
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow => Ok(max),
            IntErrorKind::NegOverflow => Ok(min),
            _ => Err(CommandError::BadArgs),
        },
    }
}

/// A command with its arguments checked and converted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Create { queue: String, capacity: NonZeroUsize },
    Enq { queue: String, item: String },
    Skip { queue: String },
    Run { quantum: NonZeroU64, steps: Option<i64> },
}

impl TryFrom<&ParsedCommand> for Command {
    type Error = CommandError;

    fn try_from(parsed: &ParsedCommand) -> Result<Self, Self::Error> {
        let args = parsed.args.as_slice();
        match parsed.name.as_str() {
            "CREATE" => match args {
                [queue, capacity] => {
                    let capacity = parse_saturating(capacity, usize::MIN, usize::MAX)?;
                    Ok(Command::Create {
                        queue: queue.clone(),
                        capacity: NonZeroUsize::new(capacity).ok_or(CommandError::BadArgs)?,
                    })
                }
                _ => Err(CommandError::BadArgs),
            },
            "ENQ" => match args {
                [queue, item] => Ok(Command::Enq {
                    queue: queue.clone(),
                    item: item.clone(),
                }),
                _ => Err(CommandError::BadArgs),
            },
            "SKIP" => match args {
                [queue] => Ok(Command::Skip {
                    queue: queue.clone(),
                }),
                _ => Err(CommandError::BadArgs),
            },
            "RUN" => {
                let (quantum, steps) = match args {
                    [quantum] => (quantum, None),
                    [quantum, steps] => (quantum, Some(steps)),
                    _ => return Err(CommandError::BadArgs),
                };
                let quantum = quantum
                    .parse::<NonZeroU64>()
                    .map_err(|_| CommandError::BadArgs)?;
                let steps = steps
                    .map(|s| parse_saturating(s, i64::MIN, i64::MAX))
                    .transpose()?;
                Ok(Command::Run { quantum, steps })
            }
            _ => Err(CommandError::UnknownCommand),
        }
    }
}

/// What a single input line amounted to.
#[derive(Debug, PartialEq, Eq)]
pub enum LineOutcome {
    /// Blank line: the session is over.
    End,
    /// Comment or whitespace-only line.
    Ignored,
    Logs(Vec<LogEntry>),
}

/// Owns the scheduler for the lifetime of one command stream.
#[derive(Debug, Default)]
pub struct Session {
    scheduler: Scheduler,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Process one line (without its trailing newline).
    pub fn handle_line(&mut self, line: &str) -> LineOutcome {
        // Only a truly empty line ends the session; whitespace is just ignored.
        if line.is_empty() {
            return LineOutcome::End;
        }
        let Some(parsed) = parse_command(line) else {
            return LineOutcome::Ignored;
        };
        let logs = match Command::try_from(&parsed) {
            Ok(command) => self.execute(command),
            Err(err) => {
                debug!(command = %parsed.name, args = ?parsed.args, "{err}");
                vec![LogEntry::command_error(err)]
            }
        };
        LineOutcome::Logs(logs)
    }

    pub fn execute(&mut self, command: Command) -> Vec<LogEntry> {
        match command {
            Command::Create { queue, capacity } => self.scheduler.create_queue(&queue, capacity),
            Command::Enq { queue, item } => self.scheduler.enqueue(&queue, &item),
            Command::Skip { queue } => self.scheduler.mark_skip(&queue),
            Command::Run { quantum, steps } => self.scheduler.run(quantum, steps),
        }
    }

    /// Drive the session from `input` until a blank line or end of input, writing notices
    /// and log lines to `out`. Returns the number of commands processed.
    ///
    /// Bytes that are not UTF-8 are replaced, so a garbled line fails on its own.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, out: &mut W) -> io::Result<usize> {
        let mut commands = 0usize;
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            if buf.last() == Some(&b'\n') {
                buf.pop();
                if buf.last() == Some(&b'\r') {
                    buf.pop();
                }
            }
            let line = String::from_utf8_lossy(&buf);
            match self.handle_line(&line) {
                LineOutcome::End => {
                    writeln!(out, "{FAREWELL}")?;
                    info!(
                        commands,
                        queues = self.scheduler.queue_count(),
                        "session ended by blank line"
                    );
                    return Ok(commands);
                }
                LineOutcome::Ignored => {}
                LineOutcome::Logs(logs) => {
                    commands += 1;
                    write_logs(out, &logs)?;
                }
            }
        }
        info!(commands, queues = self.scheduler.queue_count(), "input exhausted");
        Ok(commands)
    }
}

/// Notices go out first, as they are raised while the command executes.
pub fn write_logs<W: Write>(out: &mut W, logs: &[LogEntry]) -> io::Result<()> {
    for notice in logs.iter().filter_map(LogEntry::notice) {
        writeln!(out, "{notice}")?;
    }
    for entry in logs {
        writeln!(out, "{entry}")?;
    }
    Ok(())
}
