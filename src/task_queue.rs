//! Fixed-capacity FIFO task queue served from the head.

use std::collections::VecDeque;
use std::num::NonZeroUsize;

use crate::types::Task;

/// A bounded FIFO of tasks owned by one scheduler queue.
#[derive(Debug)]
pub struct TaskQueue {
    queue: VecDeque<Task>,
    capacity: NonZeroUsize,
}

impl TaskQueue {
    /// Create an empty queue that holds at most `capacity` tasks.
    ///
    /// Storage grows with the tasks actually queued, so any capacity is accepted.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            queue: VecDeque::new(),
            capacity,
        }
    }

    /// Push a task at the tail; returns the task back if the queue is full.
    pub fn push(&mut self, task: Task) -> Result<(), Task> {
        if self.is_full() {
            return Err(task);
        }
        self.queue.push_back(task);
        Ok(())
    }

    /// Remove the head task.
    pub fn pop(&mut self) -> Option<Task> {
        self.queue.pop_front()
    }

    /// Mutable access to the head task without removing it.
    pub fn head_mut(&mut self) -> Option<&mut Task> {
        self.queue.front_mut()
    }

    /// Tasks in service order.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.queue.iter()
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn is_full(&self) -> bool {
        self.queue.len() >= self.capacity.get()
    }

    /// Current number of queued tasks.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cap(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).expect("capacity must be non-zero")
    }

    #[test]
    fn serves_in_fifo_order() {
        let mut queue = TaskQueue::new(cap(3));
        for seq in 1..=3 {
            queue.push(Task::new("q", seq, 1)).expect("queue full");
        }
        let order: Vec<_> = std::iter::from_fn(|| queue.pop()).map(|t| t.id).collect();
        assert_eq!(order, ["q-001", "q-002", "q-003"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn push_fails_when_full_and_returns_task() {
        let mut queue = TaskQueue::new(cap(1));
        queue.push(Task::new("q", 1, 2)).expect("queue full");
        assert!(queue.is_full());
        let rejected = queue.push(Task::new("q", 2, 3));
        assert_eq!(rejected, Err(Task::new("q", 2, 3)));
        // The existing occupant is untouched.
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.iter().next().map(|t| t.id.as_str()), Some("q-001"));
    }

    #[test]
    fn head_mut_edits_in_place() {
        let mut queue = TaskQueue::new(cap(2));
        queue.push(Task::new("q", 1, 4)).expect("queue full");
        queue.push(Task::new("q", 2, 1)).expect("queue full");
        if let Some(head) = queue.head_mut() {
            head.remaining -= 3;
        }
        let remaining: Vec<_> = queue.iter().map(|t| t.remaining).collect();
        assert_eq!(remaining, [1, 1]);
    }

    #[test]
    fn huge_capacity_does_not_preallocate() {
        let mut queue = TaskQueue::new(cap(usize::MAX));
        assert_eq!(queue.capacity(), usize::MAX);
        assert!(queue.is_empty());
        queue.push(Task::new("q", 1, 1)).expect("queue full");
        assert!(!queue.is_full());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn pop_frees_capacity() {
        let mut queue = TaskQueue::new(cap(1));
        queue.push(Task::new("q", 1, 1)).expect("queue full");
        assert!(queue.pop().is_some());
        assert!(queue.pop().is_none());
        assert!(queue.push(Task::new("q", 2, 1)).is_ok());
        assert_eq!(queue.capacity(), 1);
    }
}
