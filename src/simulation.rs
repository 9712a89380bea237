/// Step executor and cursor state machine.
///
/// The whole run is an immutable `SimState` snapshot. `reduce` takes a
/// snapshot and an `Action` and returns the next snapshot; nothing else
/// mutates simulation state. Every cursor move first clears the in-flight
/// animation and bumps the generation, so ticks scheduled for the previous
/// step can no longer touch progress.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::animation::{AnimationState, DeliveryMode, TickOutcome};
use crate::cache::{CacheStore, CacheTable};
use crate::config::SimConfig;
use crate::eventlog::EventLog;
use crate::frame::Frame;
use crate::script::{Script, Step, StepKind};
use crate::task::Generation;
use crate::time::Timestamp;
use crate::topology::{HostId, Topology};

// ── Action ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// +1, clamped at the last step. From a fresh state, plays step 0.
    Advance,
    /// -1, clamped at step 0.
    Retreat,
    /// Move to an explicit index (clamped) and apply it.
    JumpTo(usize),
    /// Back to step 0 with empty caches, log, animation and frame.
    Reset,
    /// One refresh of the animation started under the given generation.
    Tick(Generation),
}

// ── Step Context ──────────────────────────────────────────────────────

/// Read-only inputs to a transition.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub topology: &'a Topology,
    pub script: &'a Script,
    pub config: &'a SimConfig,
    /// Stamp for log entries, and the refresh time for `Action::Tick`.
    pub now: Timestamp,
}

// ── Sim State ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct SimState {
    index: usize,
    /// `false` until some step's effects have been applied.
    started: bool,
    /// Shared between snapshots until a step writes to it, so a refresh
    /// tick only copies the animation.
    caches: Arc<CacheStore>,
    log: Arc<EventLog>,
    animation: Option<AnimationState>,
    inspected_frame: Option<Frame>,
    generation: Generation,
}

impl SimState {
    /// Cursor at 0, nothing applied yet.
    pub fn initial(topology: &Topology, config: &SimConfig) -> Self {
        SimState {
            index: 0,
            started: false,
            caches: Arc::new(CacheStore::new(topology)),
            log: Arc::new(EventLog::with_capacity(config.log_capacity)),
            animation: None,
            inspected_frame: None,
            generation: Generation::default(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn caches(&self) -> &CacheStore {
        &self.caches
    }

    pub fn cache(&self, host: &HostId) -> CacheTable {
        self.caches.snapshot(host)
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn animation(&self) -> Option<&AnimationState> {
        self.animation.as_ref()
    }

    /// Progress of the in-flight transmission, 0 when there is none.
    pub fn progress(&self) -> f64 {
        self.animation.as_ref().map_or(0.0, |a| a.progress)
    }

    pub fn inspected_frame(&self) -> Option<&Frame> {
        self.inspected_frame.as_ref()
    }

    /// Generation the live animation (if any) runs under.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    fn note(&mut self, time: Timestamp, message: impl Into<String>) {
        Arc::make_mut(&mut self.log).push(time, message);
    }
}

// ── Reducer ───────────────────────────────────────────────────────────

/// Compute the snapshot that follows `state` under `action`.
pub fn reduce(ctx: &StepContext<'_>, state: &SimState, action: Action) -> SimState {
    let last = ctx.script.last_index();
    match action {
        Action::Advance => {
            if !state.started {
                return enter(ctx, state, 0);
            }
            let target = (state.index + 1).min(last);
            if target == state.index {
                return state.clone();
            }
            enter(ctx, state, target)
        }
        Action::Retreat => {
            let target = state.index.saturating_sub(1);
            if state.started && target == state.index {
                return state.clone();
            }
            enter(ctx, state, target)
        }
        Action::JumpTo(index) => enter(ctx, state, index.min(last)),
        Action::Reset => {
            debug!("resetting simulation");
            SimState {
                index: 0,
                started: false,
                caches: Arc::new(state.caches.cleared()),
                log: Arc::new(EventLog::with_capacity(ctx.config.log_capacity)),
                animation: None,
                inspected_frame: None,
                generation: state.generation.next(),
            }
        }
        Action::Tick(generation) => {
            let mut next = state.clone();
            if let Some(anim) = next.animation.as_mut() {
                let outcome = anim.tick(generation, ctx.now);
                trace!(%generation, ?outcome, progress = anim.progress, "animation tick");
                if outcome == TickOutcome::Finished {
                    debug!(mode = %anim.mode, from = %anim.from, "transmission delivered");
                }
            }
            next
        }
    }
}

/// Move the cursor to `index` and apply that step from scratch.
fn enter(ctx: &StepContext<'_>, state: &SimState, index: usize) -> SimState {
    let mut next = state.clone();
    next.index = index;
    next.started = true;
    next.animation = None;
    next.generation = state.generation.next();

    if let Some(step) = ctx.script.get(index) {
        debug!(index, step = step.kind.tag(), generation = %next.generation, "applying step");
        apply_step(ctx, &mut next, step);
    }
    next
}

fn apply_step(ctx: &StepContext<'_>, next: &mut SimState, step: &Step) {
    let sender = ctx.script.sender();
    let target = ctx.script.target();
    let now = ctx.now;

    match &step.kind {
        StepKind::ScenarioStart => {
            next.note(
                now,
                format!(
                    "Scenario: {} ({}) wants to send an IPv4 packet to {}.",
                    sender.name, sender.ip, target.ip
                ),
            );
            next.note(now, "All ARP caches start empty.");
        }
        StepKind::CacheLookup => {
            let found = next.caches.lookup(&sender.id, &target.ip).unwrap_or("missing").to_owned();
            next.note(
                now,
                format!("{} looks up {} in its ARP cache: {}.", sender.name, target.ip, found),
            );
        }
        StepKind::CacheMiss => {
            next.note(
                now,
                format!(
                    "No entry for {}: {} must resolve it with ARP before sending.",
                    target.ip, sender.name
                ),
            );
        }
        StepKind::ArpRequest { frame } => {
            next.inspected_frame = Some(frame.clone());
            next.note(
                now,
                format!(
                    "ARP request: who has {}? Tell {} ({}).",
                    frame.arp.target_ip, frame.arp.sender_ip, frame.arp.sender_mac
                ),
            );
            next.note(
                now,
                format!(
                    "Destination {} is broadcast: the switch floods the request to every other host.",
                    frame.eth.dst_mac
                ),
            );
            let destinations = ctx.topology.broadcast_destinations(&sender.id);
            start_transmission(ctx, next, frame, sender.id.clone(), destinations);
        }
        StepKind::PeerReceived => {
            next.note(
                now,
                format!(
                    "{} recognizes {} as its own address; the other hosts ignore the request.",
                    target.name, target.ip
                ),
            );
        }
        StepKind::ArpReply { frame } => {
            next.inspected_frame = Some(frame.clone());
            next.note(
                now,
                format!(
                    "ARP reply: {} is at {}.",
                    frame.arp.sender_ip, frame.arp.sender_mac
                ),
            );
            next.note(
                now,
                format!(
                    "Destination {} is unicast: only {} receives the reply.",
                    frame.eth.dst_mac, sender.name
                ),
            );
            start_transmission(ctx, next, frame, target.id.clone(), vec![sender.id.clone()]);
        }
        StepKind::CacheUpdate => {
            // Both sides learn: the requester from the reply, the replier
            // from the request it answered.
            next.note(
                now,
                format!(
                    "{} caches {} -> {}; {} caches {} -> {}.",
                    sender.name, target.ip, target.mac, target.name, sender.ip, sender.mac
                ),
            );
            next.caches = Arc::new(
                next.caches
                    .update(&sender.id, &target.ip, &target.mac)
                    .update(&target.id, &sender.ip, &sender.mac),
            );
        }
        StepKind::CacheHit => {
            let mac = next.caches.lookup(&sender.id, &target.ip).unwrap_or("missing").to_owned();
            next.note(
                now,
                format!(
                    "Cache hit: {} resolves {} to {} without another ARP exchange.",
                    sender.name, target.ip, mac
                ),
            );
            next.note(
                now,
                "Resolution complete. Delivery of the IPv4 packet itself is not simulated.",
            );
        }
    }
}

fn start_transmission(
    ctx: &StepContext<'_>,
    next: &mut SimState,
    frame: &Frame,
    from: HostId,
    to: Vec<HostId>,
) {
    let mode = DeliveryMode::of(frame);
    debug!(%mode, %from, destinations = to.len(), "starting transmission");
    next.animation = Some(AnimationState::start(
        frame.clone(),
        from,
        to,
        ctx.topology.switch().map(|h| h.id.clone()),
        ctx.config.timeline(mode),
        next.generation,
    ));
}
