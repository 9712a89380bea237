/// Deterministic timed-task queue.
///
/// Uses a `BinaryHeap` with reversed `Ord` on `Task` as a min-heap keyed by
/// `(due_at, task_id)`. The queue does not judge staleness; the caller
/// compares each dispatched task's generation with the live one.

use std::collections::BinaryHeap;

use crate::task::{Generation, Task, TaskId, TaskIdGen, TaskKind};
use crate::time::Timestamp;

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    /// Min-heap (via reversed Ord on Task).
    queue: BinaryHeap<Task>,
    id_gen: TaskIdGen,
}

impl Scheduler {
    /// Create a new, empty scheduler.
    pub fn new() -> Self {
        Scheduler {
            queue: BinaryHeap::new(),
            id_gen: TaskIdGen::new(),
        }
    }

    /// Queue a task due at `at`, tagged with `generation`.
    pub fn schedule(&mut self, at: Timestamp, generation: Generation, kind: TaskKind) -> TaskId {
        let id = self.id_gen.next_id();
        self.queue.push(Task::new(id, at, generation, kind));
        id
    }

    /// Remove every pending task of `kind`.
    pub fn cancel(&mut self, kind: TaskKind) -> usize {
        let before = self.queue.len();
        self.queue.retain(|t| t.kind != kind);
        before - self.queue.len()
    }

    /// Pop every task due at or before `now`, earliest first.
    ///
    /// Tasks scheduled while the caller processes the returned batch wait
    /// for the next drain, even if they are already due.
    pub fn drain_due(&mut self, now: Timestamp) -> Vec<Task> {
        let mut due = Vec::new();
        while self.queue.peek().is_some_and(|t| t.due_at <= now) {
            if let Some(task) = self.queue.pop() {
                due.push(task);
            }
        }
        due
    }

    /// Pop the earliest task regardless of its due time.
    pub fn pop_next(&mut self) -> Option<Task> {
        self.queue.pop()
    }

    /// Peek at the next task without removing it.
    pub fn peek_next(&self) -> Option<&Task> {
        self.queue.peek()
    }

    /// Whether a task of `kind` is pending.
    pub fn has_pending(&self, kind: TaskKind) -> bool {
        self.queue.iter().any(|t| t.kind == kind)
    }

    /// Whether no tasks remain.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of pending tasks.
    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(ms: u64) -> Timestamp {
        Timestamp::from_millis(ms)
    }

    #[test]
    fn test_fifo_at_same_time() {
        let mut sched = Scheduler::new();
        let g = Generation::default();

        let a = sched.schedule(ts(10), g, TaskKind::AnimationFrame);
        let b = sched.schedule(ts(10), g, TaskKind::AutoAdvance);
        let c = sched.schedule(ts(10), g, TaskKind::AnimationFrame);

        let ids: Vec<TaskId> = sched.drain_due(ts(10)).into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![a, b, c]);
    }

    #[test]
    fn test_drain_due_respects_time() {
        let mut sched = Scheduler::new();
        let g = Generation::default();

        sched.schedule(ts(30), g, TaskKind::AutoAdvance);
        sched.schedule(ts(10), g, TaskKind::AnimationFrame);
        sched.schedule(ts(20), g, TaskKind::AnimationFrame);

        let due = sched.drain_due(ts(20));
        let times: Vec<u64> = due.iter().map(|t| t.due_at.millis()).collect();
        assert_eq!(times, vec![10, 20]);
        assert_eq!(sched.len(), 1);
        assert!(sched.drain_due(ts(29)).is_empty());
        assert_eq!(sched.drain_due(ts(30)).len(), 1);
        assert!(sched.is_empty());
    }

    #[test]
    fn test_cancel_by_kind() {
        let mut sched = Scheduler::new();
        let g = Generation::default();

        sched.schedule(ts(5), g, TaskKind::AnimationFrame);
        sched.schedule(ts(6), g, TaskKind::AnimationFrame);
        sched.schedule(ts(7), g, TaskKind::AutoAdvance);

        assert_eq!(sched.cancel(TaskKind::AnimationFrame), 2);
        assert!(!sched.has_pending(TaskKind::AnimationFrame));
        assert!(sched.has_pending(TaskKind::AutoAdvance));
        assert_eq!(sched.peek_next().map(|t| t.kind), Some(TaskKind::AutoAdvance));
    }

    #[test]
    fn test_generation_is_carried() {
        let mut sched = Scheduler::new();
        sched.schedule(ts(0), Generation::new(3), TaskKind::AnimationFrame);
        let task = sched.pop_next().unwrap();
        assert_eq!(task.generation, Generation::new(3));
    }

    #[test]
    fn test_determinism_across_runs() {
        fn build() -> Vec<Task> {
            let mut sched = Scheduler::new();
            let g = Generation::default();
            sched.schedule(ts(5), g, TaskKind::AutoAdvance);
            sched.schedule(ts(3), g, TaskKind::AnimationFrame);
            sched.schedule(ts(5), g, TaskKind::AnimationFrame);
            sched.schedule(ts(1), g, TaskKind::AutoAdvance);
            sched.drain_due(ts(100))
        }
        assert_eq!(build(), build());
    }
}
