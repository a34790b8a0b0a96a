//! Round-robin scheduler over named, fixed-capacity task queues.

use std::collections::HashMap;
use std::num::{NonZeroU64, NonZeroUsize};

use tracing::{debug, trace};

use crate::error::{Rejection, ScheduleError};
use crate::event::{Event, LogEntry};
use crate::snapshot::{QueueView, Snapshot};
use crate::task_queue::TaskQueue;
use crate::types::{Menu, QueueId, Task, Work};

/// Per-queue state: the tasks plus the id counter and one-shot skip flag.
#[derive(Debug)]
struct QueueSlot {
    id: QueueId,
    tasks: TaskQueue,
    /// Last sequence number handed out; bumped even when the push is rejected.
    last_seq: u64,
    skip: bool,
}

/// Owns all simulation state. Queues are never removed, so indices stay valid.
#[derive(Debug)]
pub struct Scheduler {
    time: Work,
    queues: Vec<QueueSlot>,
    by_id: HashMap<QueueId, usize>,
    cursor: usize,
    menu: Menu,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            time: 0,
            queues: Vec::new(),
            by_id: HashMap::new(),
            cursor: 0,
            menu: Menu::standard(),
        }
    }

    fn slot_index(&self, id: &str) -> Result<usize, ScheduleError> {
        self.by_id
            .get(id)
            .copied()
            .ok_or_else(|| ScheduleError::QueueNotFound(id.to_string()))
    }

    /// Append a new empty queue at the end of the round-robin order.
    pub fn create_queue(&mut self, id: &str, capacity: NonZeroUsize) -> Vec<LogEntry> {
        if self.by_id.contains_key(id) {
            let err = ScheduleError::QueueExists(id.to_string());
            debug!(queue = id, "{err}");
            return vec![LogEntry::schedule_error(self.time, &err)];
        }
        self.by_id.insert(id.to_string(), self.queues.len());
        self.queues.push(QueueSlot {
            id: id.to_string(),
            tasks: TaskQueue::new(capacity),
            last_seq: 0,
            skip: false,
        });
        debug!(queue = id, capacity = capacity.get(), "queue created");
        vec![LogEntry::at(self.time, Event::Create { queue: id.to_string() })]
    }

    /// Order `item` onto queue `id`.
    ///
    /// The menu is consulted before the queue, so an unknown item is reported even for a
    /// missing queue. A full queue still consumes a sequence number.
    pub fn enqueue(&mut self, id: &str, item: &str) -> Vec<LogEntry> {
        let Some(work) = self.menu.work_for(item) else {
            debug!(queue = id, item, "unknown item");
            return vec![self.reject(id, Rejection::UnknownItem)];
        };
        let index = match self.slot_index(id) {
            Ok(index) => index,
            Err(err) => return vec![LogEntry::schedule_error(self.time, &err)],
        };

        let slot = &mut self.queues[index];
        slot.last_seq += 1;
        let task = Task::new(id, slot.last_seq, work);
        let task_id = task.id.clone();
        match slot.tasks.push(task) {
            Ok(()) => {
                debug!(queue = id, task = %task_id, item, "task enqueued");
                vec![LogEntry::at(
                    self.time,
                    Event::Enqueue {
                        queue: id.to_string(),
                        task: task_id,
                        remaining: work,
                    },
                )]
            }
            Err(dropped) => {
                debug!(queue = id, task = %dropped.id, "queue full, sequence number consumed");
                vec![self.reject(id, Rejection::Full)]
            }
        }
    }

    fn reject(&self, id: &str, reason: Rejection) -> LogEntry {
        LogEntry::at(
            self.time,
            Event::Reject {
                queue: id.to_string(),
                reason,
            },
        )
    }

    /// Make queue `id` give up its next turn. Setting it twice is the same as once.
    pub fn mark_skip(&mut self, id: &str) -> Vec<LogEntry> {
        match self.slot_index(id) {
            Ok(index) => {
                self.queues[index].skip = true;
                debug!(queue = id, "skip pending");
                vec![LogEntry::at(self.time, Event::Skip { queue: id.to_string() })]
            }
            Err(err) => vec![LogEntry::schedule_error(self.time, &err)],
        }
    }

    /// Execute `steps` round-robin turns (default: one per queue), each granting up to
    /// `quantum` work units to the head task of the queue under the cursor.
    pub fn run(&mut self, quantum: NonZeroU64, steps: Option<i64>) -> Vec<LogEntry> {
        let queues = self.queues.len();
        let steps = steps.unwrap_or(queues as i64);
        if steps < 1 || steps as u64 > queues as u64 {
            let err = ScheduleError::InvalidSteps { steps, queues };
            debug!("{err}");
            return vec![LogEntry::schedule_error(self.time, &err)];
        }

        let mut logs = Vec::new();
        for _ in 0..steps {
            if self.queues.is_empty() {
                break;
            }
            self.step(quantum.get(), &mut logs);
            self.cursor = (self.cursor + 1) % self.queues.len();
        }
        debug!(time = self.time, cursor = self.cursor, "run finished");
        logs
    }

    fn step(&mut self, quantum: Work, logs: &mut Vec<LogEntry>) {
        let slot = &mut self.queues[self.cursor];
        let queue = slot.id.clone();
        logs.push(LogEntry::at(self.time, Event::Run { queue: queue.clone() }));

        if slot.skip {
            slot.skip = false;
            trace!(queue = %queue, "turn skipped");
            return;
        }
        let Some(head) = slot.tasks.head_mut() else {
            trace!(queue = %queue, "idle");
            return;
        };

        let done = head.remaining.min(quantum);
        head.remaining -= done;
        let finished = head.remaining == 0;
        let task = head.id.clone();
        self.time += done;
        logs.push(LogEntry::at(
            self.time,
            Event::Work {
                queue: queue.clone(),
                task: task.clone(),
                done,
            },
        ));
        if finished {
            slot.tasks.pop();
            trace!(queue = %queue, task = %task, "task finished");
            logs.push(LogEntry::at(self.time, Event::Finish { queue, task }));
        }
    }

    /// Read-only view of the full state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            time: self.time,
            next: self.next_queue().map(str::to_string),
            menu: self.menu.iter().collect(),
            queues: self
                .queues
                .iter()
                .map(|slot| QueueView {
                    id: slot.id.clone(),
                    capacity: slot.tasks.capacity(),
                    skip: slot.skip,
                    tasks: slot.tasks.iter().cloned().collect(),
                })
                .collect(),
        }
    }

    /// Queue the cursor points at, if any exist.
    pub fn next_queue(&self) -> Option<&str> {
        self.queues.get(self.cursor).map(|slot| slot.id.as_str())
    }

    pub fn time(&self) -> Work {
        self.time
    }

    pub fn queue_count(&self) -> usize {
        self.queues.len()
    }

    /// Number of tasks held by queue `id`.
    #[cfg(test)]
    pub fn queue_len(&self, id: &str) -> Option<usize> {
        let index = self.slot_index(id).ok()?;
        Some(self.queues[index].tasks.len())
    }

    /// True when no queue holds more tasks than its capacity.
    pub fn within_capacity(&self) -> bool {
        self.queues
            .iter()
            .all(|slot| slot.tasks.len() <= slot.tasks.capacity())
    }

    /// Total tasks still waiting across all queues.
    pub fn pending_tasks(&self) -> usize {
        self.queues.iter().map(|slot| slot.tasks.len()).sum()
    }
}
