//! Read-only diagnostic view of scheduler state.

use std::fmt;

use crate::types::{QueueId, Task, Work};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueueView {
    pub id: QueueId,
    pub capacity: usize,
    pub skip: bool,
    /// FIFO order, head first.
    pub tasks: Vec<Task>,
}

/// Point-in-time copy of the clock, cursor, menu, and every queue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub time: Work,
    /// Queue under the round-robin cursor.
    pub next: Option<QueueId>,
    /// Sorted by item name.
    pub menu: Vec<(&'static str, Work)>,
    pub queues: Vec<QueueView>,
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "display time={} next={}",
            self.time,
            self.next.as_deref().unwrap_or("None")
        )?;
        let menu: Vec<String> = self
            .menu
            .iter()
            .map(|(name, work)| format!("{name}:{work}"))
            .collect();
        write!(f, "display menu=[{}]", menu.join(","))?;
        for queue in &self.queues {
            let tasks: Vec<String> = queue
                .tasks
                .iter()
                .map(|task| format!("{}:{}", task.id, task.remaining))
                .collect();
            write!(
                f,
                "\ndisplay {} [{}/{}]{} -> [{}]",
                queue.id,
                queue.tasks.len(),
                queue.capacity,
                if queue.skip { " skip" } else { "" },
                tasks.join(",")
            )?;
        }
        Ok(())
    }
}
