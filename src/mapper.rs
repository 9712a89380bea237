//! Progress → position mapping for a frame in flight.
//!
//! A transmission is drawn in three phases: travelling from the source to
//! the switch, sitting at the switch (store-and-forward), and travelling on
//! to the destination(s). The renderer only needs the phase and a 0..=1
//! fraction within it.

/// Share of the timeline spent held at the switch.
pub const PAUSE_FRACTION: f64 = 0.18;

/// Switch arrival point for unicast frames.
pub const UNICAST_SPLIT: f64 = 0.5;

/// Switch arrival point for broadcast frames.
pub const BROADCAST_SPLIT: f64 = 0.38;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "kebab-case"))]
pub enum Phase {
    /// Source → switch.
    Pre,
    /// Held at the switch.
    AtSwitch,
    /// Switch → destination(s).
    Post,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Pre => write!(f, "pre"),
            Phase::AtSwitch => write!(f, "at-switch"),
            Phase::Post => write!(f, "post"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct PhasePosition {
    pub phase: Phase,
    /// Fraction of the current phase completed, in `[0, 1]`.
    pub local: f64,
}

/// Map overall progress `t` onto a phase and a fraction within it.
pub fn map_progress(t: f64, split: f64, pause: f64) -> PhasePosition {
    if t < split {
        return PhasePosition {
            phase: Phase::Pre,
            local: (t / split).clamp(0.0, 1.0),
        };
    }

    if t < split + pause {
        return PhasePosition {
            phase: Phase::AtSwitch,
            local: 1.0,
        };
    }

    let remaining = 1.0 - split - pause;
    let local = if remaining > 0.0 {
        ((t - split - pause) / remaining).clamp(0.0, 1.0)
    } else {
        1.0
    };
    PhasePosition {
        phase: Phase::Post,
        local,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_unicast_phase_boundaries() {
        let dwell_end = UNICAST_SPLIT + PAUSE_FRACTION;
        for i in 0..=100 {
            let t = i as f64 / 100.0;
            let pos = map_progress(t, UNICAST_SPLIT, PAUSE_FRACTION);
            let expected = if t < UNICAST_SPLIT {
                Phase::Pre
            } else if t < dwell_end {
                Phase::AtSwitch
            } else {
                Phase::Post
            };
            assert_eq!(pos.phase, expected, "t = {}", t);
            assert!((0.0..=1.0).contains(&pos.local));
        }
        assert_eq!(map_progress(0.499, 0.5, 0.18).phase, Phase::Pre);
        assert_eq!(map_progress(0.5, 0.5, 0.18).phase, Phase::AtSwitch);
        assert_eq!(map_progress(0.679, 0.5, 0.18).phase, Phase::AtSwitch);
        assert_eq!(map_progress(0.681, 0.5, 0.18).phase, Phase::Post);
        assert_eq!(map_progress(1.0, 0.5, 0.18).phase, Phase::Post);
    }

    #[test]
    fn test_pre_is_linear() {
        let pos = map_progress(0.25, UNICAST_SPLIT, PAUSE_FRACTION);
        assert!(approx(pos.local, 0.5));
        let pos = map_progress(0.19, BROADCAST_SPLIT, PAUSE_FRACTION);
        assert!(approx(pos.local, 0.5));
    }

    #[test]
    fn test_dwell_is_frozen() {
        for t in [0.5, 0.55, 0.6, 0.679] {
            let pos = map_progress(t, UNICAST_SPLIT, PAUSE_FRACTION);
            assert_eq!(pos.phase, Phase::AtSwitch);
            assert_eq!(pos.local, 1.0);
        }
    }

    #[test]
    fn test_post_reaches_one() {
        let pos = map_progress(1.0, BROADCAST_SPLIT, PAUSE_FRACTION);
        assert_eq!(pos.phase, Phase::Post);
        assert!(approx(pos.local, 1.0));

        let mid = map_progress(0.56 + 0.22, BROADCAST_SPLIT, PAUSE_FRACTION);
        assert!(approx(mid.local, 0.5));
    }

    #[test]
    fn test_degenerate_remaining_span() {
        let pos = map_progress(1.0, 0.6, 0.4);
        assert_eq!(pos.phase, Phase::Post);
        assert_eq!(pos.local, 1.0);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::AtSwitch.to_string(), "at-switch");
    }
}
