/// Transmission animation model.
///
/// An `AnimationState` describes one frame in flight: who sent it, where it
/// is going, and how far along it is. Progress advances only from `tick`,
/// which the refresh loop calls with the current timestamp. Each state is
/// bound to the `Generation` it was started under; ticks from any other
/// generation are ignored.

use crate::frame::Frame;
use crate::mapper::{map_progress, PhasePosition, BROADCAST_SPLIT, PAUSE_FRACTION, UNICAST_SPLIT};
use crate::task::Generation;
use crate::time::Timestamp;
use crate::topology::HostId;

/// Time for one transmission to cross the segment.
pub const TRANSMIT_DURATION_MS: u64 = 1200;

// ── Delivery mode ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "lowercase"))]
pub enum DeliveryMode {
    /// To every end host except the sender.
    Broadcast,
    /// To exactly one host.
    Unicast,
}

impl DeliveryMode {
    /// Mode implied by the frame's link-layer destination.
    pub fn of(frame: &Frame) -> Self {
        if frame.is_broadcast() {
            DeliveryMode::Broadcast
        } else {
            DeliveryMode::Unicast
        }
    }

    /// Default point on the timeline where the frame reaches the switch.
    pub fn default_split(self) -> f64 {
        match self {
            DeliveryMode::Broadcast => BROADCAST_SPLIT,
            DeliveryMode::Unicast => UNICAST_SPLIT,
        }
    }
}

impl std::fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryMode::Broadcast => write!(f, "broadcast"),
            DeliveryMode::Unicast => write!(f, "unicast"),
        }
    }
}

// ── Timeline ──────────────────────────────────────────────────────────

/// Timing parameters for one transmission.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Timeline {
    pub duration_ms: u64,
    pub split: f64,
    pub pause: f64,
}

impl Timeline {
    /// The built-in timeline for `mode`.
    pub fn for_mode(mode: DeliveryMode) -> Self {
        Timeline {
            duration_ms: TRANSMIT_DURATION_MS,
            split: mode.default_split(),
            pause: PAUSE_FRACTION,
        }
    }
}

// ── Tick outcome ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// The tick belongs to a superseded generation and was ignored.
    Stale,
    /// The animation already finished; nothing changed.
    Idle,
    /// Progress moved to the contained value and is still below 1.
    Advanced(f64),
    /// Progress reached 1 on this tick. No further ticks are needed.
    Finished,
}

// ── Leg ───────────────────────────────────────────────────────────────

/// One source → destination path of a transmission, as drawn.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Leg {
    pub from: HostId,
    pub to: HostId,
    pub position: PhasePosition,
}

// ── Animation state ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimationState {
    pub mode: DeliveryMode,
    pub from: HostId,
    pub to: Vec<HostId>,
    /// Switch the frame is forwarded through.
    pub via: Option<HostId>,
    pub frame: Frame,
    pub progress: f64,
    pub generation: Generation,
    pub timeline: Timeline,
    /// Time of the first tick. `None` until a refresh has reached it.
    pub started_at: Option<Timestamp>,
    last_tick: Option<Timestamp>,
    running: bool,
}

impl AnimationState {
    /// Start a transmission at progress 0. The first tick sets the time
    /// baseline and adds nothing, so a transmission started long after the
    /// last refresh still plays in full.
    pub fn start(
        frame: Frame,
        from: HostId,
        to: Vec<HostId>,
        via: Option<HostId>,
        timeline: Timeline,
        generation: Generation,
    ) -> Self {
        AnimationState {
            mode: DeliveryMode::of(&frame),
            from,
            to,
            via,
            frame,
            progress: 0.0,
            generation,
            timeline,
            started_at: None,
            last_tick: None,
            running: true,
        }
    }

    /// Advance progress by the wall-clock time since the previous tick.
    pub fn tick(&mut self, generation: Generation, now: Timestamp) -> TickOutcome {
        if generation != self.generation {
            return TickOutcome::Stale;
        }
        if !self.running {
            return TickOutcome::Idle;
        }

        let delta = self.last_tick.map_or(0, |last| now.saturating_since(last));
        self.last_tick = Some(now);
        self.started_at.get_or_insert(now);

        self.progress = if self.timeline.duration_ms == 0 {
            1.0
        } else {
            (self.progress + delta as f64 / self.timeline.duration_ms as f64).clamp(0.0, 1.0)
        };

        if self.progress >= 1.0 {
            self.running = false;
            TickOutcome::Finished
        } else {
            TickOutcome::Advanced(self.progress)
        }
    }

    /// Still waiting for ticks.
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }

    /// Where the frame is along the source → switch → destination path.
    pub fn position(&self) -> PhasePosition {
        map_progress(self.progress, self.timeline.split, self.timeline.pause)
    }

    /// One leg per destination. All legs share the same position, so a
    /// broadcast fans out in lockstep.
    pub fn legs(&self) -> Vec<Leg> {
        let position = self.position();
        self.to
            .iter()
            .map(|to| Leg {
                from: self.from.clone(),
                to: to.clone(),
                position,
            })
            .collect()
    }
}
