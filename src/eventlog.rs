/// Learner-facing event log.
///
/// Entries are prepended, so iteration is newest-first. The log is bounded:
/// once it holds `capacity` entries, pushing another drops the oldest. A
/// deterministic hash over the contents lets two runs be compared for
/// replay equality.

use std::collections::VecDeque;
use std::io::{self, Write};

use crate::time::Timestamp;

/// Default number of entries kept.
pub const DEFAULT_LOG_CAPACITY: usize = 200;

// ── Hash utility ──────────────────────────────────────────────────────

/// Combine two u64 hashes deterministically.
pub fn hash_combine(a: u64, b: u64) -> u64 {
    let mut h = a;
    h = h.wrapping_mul(0x517cc1b727220a95);
    h = h.wrapping_add(b);
    h ^= h >> 32;
    h
}

/// Hash a byte slice deterministically (FNV-1a variant).
pub fn hash_bytes(data: &[u8]) -> u64 {
    let mut h: u64 = 0xcbf29ce484222325;
    for &b in data {
        h ^= b as u64;
        h = h.wrapping_mul(0x100000001b3);
    }
    h
}

// ── Log Entry ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct LogEntry {
    pub time: Timestamp,
    /// `mm:ss.mmm` rendering of `time`.
    pub label: String,
    pub message: String,
}

impl LogEntry {
    pub fn new(time: Timestamp, message: impl Into<String>) -> Self {
        LogEntry {
            time,
            label: time.label(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.label, self.message)
    }
}

// ── Event Log ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct EventLog {
    /// Front is newest.
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl EventLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }

    /// A log that keeps at most `capacity` entries (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        EventLog {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Prepend an entry, discarding the oldest beyond capacity.
    pub fn push(&mut self, time: Timestamp, message: impl Into<String>) {
        self.entries.push_front(LogEntry::new(time, message));
        self.entries.truncate(self.capacity);
    }

    /// Entries, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Owned newest-first copy.
    pub fn to_vec(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn newest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Deterministic hash of every entry's time and message.
    pub fn log_hash(&self) -> u64 {
        let mut h: u64 = 0;
        for entry in &self.entries {
            h = hash_combine(h, entry.time.millis());
            h = hash_combine(h, hash_bytes(entry.message.as_bytes()));
        }
        h
    }

    /// Write the log oldest-first, one entry per line.
    pub fn export<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "# ARP STEPPER EVENT LOG v1")?;
        writeln!(w, "# entries: {}", self.entries.len())?;
        for entry in self.entries.iter().rev() {
            writeln!(w, "{}", entry)?;
        }
        Ok(())
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Compare two logs entry by entry.
pub fn logs_match(a: &EventLog, b: &EventLog) -> bool {
    a.entries == b.entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_first() {
        let mut log = EventLog::new();
        log.push(Timestamp::from_millis(0), "first");
        log.push(Timestamp::from_millis(10), "second");

        let messages: Vec<&str> = log.entries().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["second", "first"]);
        assert_eq!(log.newest().unwrap().message, "second");
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut log = EventLog::new();
        for i in 0..250u64 {
            log.push(Timestamp::from_millis(i), format!("entry {}", i));
        }
        assert_eq!(log.len(), DEFAULT_LOG_CAPACITY);
        assert_eq!(log.newest().unwrap().message, "entry 249");
        assert_eq!(log.entries().last().unwrap().message, "entry 50");
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let mut log = EventLog::with_capacity(0);
        log.push(Timestamp::ZERO, "a");
        log.push(Timestamp::ZERO, "b");
        assert_eq!(log.len(), 1);
        assert_eq!(log.newest().unwrap().message, "b");
    }

    #[test]
    fn test_clear() {
        let mut log = EventLog::new();
        log.push(Timestamp::ZERO, "a");
        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.log_hash(), EventLog::new().log_hash());
    }

    #[test]
    fn test_entry_label() {
        let entry = LogEntry::new(Timestamp::from_millis(1_350), "hello");
        assert_eq!(entry.label, "00:01.350");
        assert_eq!(entry.to_string(), "[00:01.350] hello");
    }

    #[test]
    fn test_hash_distinguishes_content() {
        let mut a = EventLog::new();
        let mut b = EventLog::new();
        a.push(Timestamp::ZERO, "x");
        b.push(Timestamp::ZERO, "y");
        assert_ne!(a.log_hash(), b.log_hash());
        assert!(!logs_match(&a, &b));

        let mut c = EventLog::new();
        c.push(Timestamp::ZERO, "x");
        assert_eq!(a.log_hash(), c.log_hash());
        assert!(logs_match(&a, &c));
    }

    #[test]
    fn test_export_oldest_first() {
        let mut log = EventLog::new();
        log.push(Timestamp::from_millis(0), "first");
        log.push(Timestamp::from_millis(5), "second");

        let mut out = Vec::new();
        log.export(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "# ARP STEPPER EVENT LOG v1");
        assert_eq!(lines[1], "# entries: 2");
        assert_eq!(lines[2], "[00:00.000] first");
        assert_eq!(lines[3], "[00:00.005] second");
    }
}
