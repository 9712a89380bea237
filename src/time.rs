/// Millisecond timestamps fed in by the display-refresh trigger.
///
/// The simulator never reads a clock on its own. Every tick, interval and
/// log entry is stamped with the `Timestamp` the host environment hands to
/// `Simulator::on_frame`, so two runs fed the same timestamps are identical.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp(u64);

impl Timestamp {
    /// The zero-point of the simulation clock.
    pub const ZERO: Timestamp = Timestamp(0);

    /// Create a timestamp from a raw millisecond value.
    #[inline]
    pub fn from_millis(ms: u64) -> Self {
        Timestamp(ms)
    }

    /// Return the raw millisecond value.
    #[inline]
    pub fn millis(self) -> u64 {
        self.0
    }

    /// Compute the timestamp `delta` milliseconds after `self`.
    /// Returns `None` on overflow.
    #[inline]
    pub fn plus(self, delta: u64) -> Option<Timestamp> {
        self.0.checked_add(delta).map(Timestamp)
    }

    /// Milliseconds elapsed since `earlier`, or `None` if `earlier` is later.
    #[inline]
    pub fn duration_since(self, earlier: Timestamp) -> Option<u64> {
        self.0.checked_sub(earlier.0)
    }

    /// Like `duration_since`, but a clock that ran backwards counts as no
    /// elapsed time.
    #[inline]
    pub fn saturating_since(self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Human-readable `mm:ss.mmm` label used on event-log entries.
    pub fn label(self) -> String {
        let minutes = self.0 / 60_000;
        let seconds = (self.0 / 1000) % 60;
        let millis = self.0 % 1000;
        format!("{:02}:{:02}.{:03}", minutes, seconds, millis)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero() {
        assert_eq!(Timestamp::ZERO.millis(), 0);
        assert_eq!(Timestamp::default(), Timestamp::ZERO);
    }

    #[test]
    fn test_plus_overflow() {
        assert_eq!(Timestamp::from_millis(10).plus(5), Some(Timestamp::from_millis(15)));
        assert!(Timestamp::from_millis(u64::MAX).plus(1).is_none());
    }

    #[test]
    fn test_duration_since() {
        let t1 = Timestamp::from_millis(100);
        let t2 = Timestamp::from_millis(350);
        assert_eq!(t2.duration_since(t1), Some(250));
        assert_eq!(t1.duration_since(t2), None);
        assert_eq!(t1.saturating_since(t2), 0);
    }

    #[test]
    fn test_label() {
        assert_eq!(Timestamp::ZERO.label(), "00:00.000");
        assert_eq!(Timestamp::from_millis(61_250).label(), "01:01.250");
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Timestamp::from_millis(42)), "42ms");
    }
}
