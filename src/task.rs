/// Timed tasks for the cooperative refresh loop.
///
/// Two things recur while a run is on screen: animation ticks (one per
/// display refresh) and the auto-advance interval. Both are modelled as
/// `Task` records placed on the `Scheduler`, each stamped with the
/// `Generation` that was current when it was scheduled. A task whose
/// generation has since been superseded is dropped on dispatch.

use crate::time::Timestamp;
use std::cmp::Ordering;

// ── Generation ────────────────────────────────────────────────────────

/// Epoch of a cancellable activity.
///
/// Cancelling bumps the owner's generation, which turns every task still
/// carrying the old value into a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Generation(u64);

impl Generation {
    /// Wrap a raw generation number.
    #[inline]
    pub fn new(raw: u64) -> Self {
        Generation(raw)
    }

    /// The underlying counter value.
    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }

    /// The generation that supersedes this one.
    #[inline]
    pub fn next(self) -> Generation {
        Generation(self.0.wrapping_add(1))
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "G#{}", self.0)
    }
}

// ── Task ID ───────────────────────────────────────────────────────────

/// Strictly increasing task identifier; breaks ties between tasks due at
/// the same timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct TaskId(u64);

impl TaskId {
    #[inline]
    pub fn new(raw: u64) -> Self {
        TaskId(raw)
    }

    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "T#{}", self.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaskIdGen {
    next: u64,
}

impl TaskIdGen {
    /// Create a generator starting at 0.
    pub fn new() -> Self {
        TaskIdGen { next: 0 }
    }

    /// Allocate the next ID.
    pub fn next_id(&mut self) -> TaskId {
        let id = TaskId(self.next);
        self.next += 1;
        id
    }

    /// The ID the next call to `next_id` will return.
    pub fn peek(&self) -> TaskId {
        TaskId(self.next)
    }
}

// ── Task Kind ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum TaskKind {
    /// Advance the in-flight transmission by one refresh.
    AnimationFrame,
    /// Move the cursor forward, as a manual "next" would.
    AutoAdvance,
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskKind::AnimationFrame => write!(f, "AnimationFrame"),
            TaskKind::AutoAdvance => write!(f, "AutoAdvance"),
        }
    }
}

// ── Task ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Task {
    pub id: TaskId,
    pub due_at: Timestamp,
    pub generation: Generation,
    pub kind: TaskKind,
}

impl Task {
    /// Create a new task.
    pub fn new(id: TaskId, due_at: Timestamp, generation: Generation, kind: TaskKind) -> Self {
        Task {
            id,
            due_at,
            generation,
            kind,
        }
    }
}

/// Ordering: smallest `(due_at, id)` first.
///
/// Reversed so `BinaryHeap` (a max-heap) pops the earliest task.
impl Ord for Task {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due_at
            .cmp(&self.due_at)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for Task {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
