//! Tick-indexed deferred task queue.
use std::collections::BTreeMap;

/// Handle to a scheduled task, usable for cancellation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TaskId {
    pub due: u64,
    pub seq: u64,
}

/// Tasks ordered by (due tick, insertion order).
#[derive(Clone, Debug)]
pub struct TaskQueue<T> {
    tasks: BTreeMap<TaskId, T>,
    next_seq: u64,
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self {
            tasks: BTreeMap::new(),
            next_seq: 0,
        }
    }
}

impl<T> TaskQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `task` to run `delay` ticks after `now`.
    pub fn schedule(&mut self, now: u64, delay: u64, task: T) -> TaskId {
        let id = TaskId {
            due: now.saturating_add(delay),
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.tasks.insert(id, task);
        id
    }

    pub fn cancel(&mut self, id: TaskId) -> Option<T> {
        self.tasks.remove(&id)
    }

    /// Drains every task due at or before `now`.
    pub fn poll(&mut self, now: u64) -> Vec<T> {
        let later = self.tasks.split_off(&TaskId {
            due: now.saturating_add(1),
            seq: 0,
        });
        let due = std::mem::replace(&mut self.tasks, later);
        due.into_values().collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Due tick of the earliest task.
    pub fn next_due(&self) -> Option<u64> {
        self.tasks.keys().next().map(|id| id.due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polls_in_due_then_insertion_order() {
        let mut queue = TaskQueue::new();
        queue.schedule(0, 2, "b");
        queue.schedule(0, 1, "a");
        queue.schedule(0, 2, "c");
        queue.schedule(0, 5, "later");

        assert!(queue.poll(0).is_empty());
        assert_eq!(queue.poll(2), vec!["a", "b", "c"]);
        assert_eq!(queue.next_due(), Some(5));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn cancelled_tasks_never_run() {
        let mut queue = TaskQueue::new();
        let id = queue.schedule(10, 1, 7u32);
        queue.schedule(10, 1, 8u32);
        assert_eq!(queue.cancel(id), Some(7));
        assert_eq!(queue.cancel(id), None);
        assert_eq!(queue.poll(11), vec![8]);
        assert!(queue.is_empty());
    }
}
