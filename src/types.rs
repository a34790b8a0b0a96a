//! Shared identifiers, the task model, and the fixed menu.

use std::collections::BTreeMap;

/// Identifier of a queue as given on the command line.
pub type QueueId = String;
/// Work units owed by a task; also the unit the clock advances in.
pub type Work = u64;

/// Unit of work held by a queue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Task {
    /// `<queue>-<NNN>` identifier, unique within its queue.
    pub id: String,
    /// Work units still owed before the task finishes.
    pub remaining: Work,
}

impl Task {
    /// Construct a task with a sequence-derived id.
    pub fn new(queue: &str, seq: u64, remaining: Work) -> Self {
        Self {
            id: format!("{queue}-{seq:03}"),
            remaining,
        }
    }
}

const STANDARD_ITEMS: [(&str, Work); 7] = [
    ("americano", 2),
    ("latte", 3),
    ("cappuccino", 3),
    ("mocha", 4),
    ("tea", 1),
    ("macchiato", 2),
    ("hot_chocolate", 4),
];

/// Read-only catalog from item name to required work units.
#[derive(Clone, Debug)]
pub struct Menu {
    items: BTreeMap<&'static str, Work>,
}

impl Menu {
    /// The catalog every scheduler starts with.
    pub fn standard() -> Self {
        Self {
            items: STANDARD_ITEMS.into_iter().collect(),
        }
    }

    /// Work units for `item`, or `None` if we don't serve it.
    pub fn work_for(&self, item: &str) -> Option<Work> {
        self.items.get(item).copied()
    }

    /// Items sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Work)> + '_ {
        self.items.iter().map(|(&name, &work)| (name, work))
    }
}
