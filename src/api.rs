/// Step-by-step simulator API for the presentation layer.
///
/// `Simulator` owns the topology, the generated script and the current
/// `SimState` snapshot, and exposes cursor control plus read-only views of
/// caches, log, animation and the selected frame. It also runs the
/// cooperative loop: the host calls `on_frame(now)` from its display-refresh
/// callback, and due animation ticks and auto-advance intervals are
/// dispatched from there, in order, on the caller's thread.

use tracing::{debug, info, trace};

use crate::animation::AnimationState;
use crate::cache::CacheTable;
use crate::config::SimConfig;
use crate::error::SimResult;
use crate::eventlog::LogEntry;
use crate::frame::{describe, FrameDescription};
use crate::scheduler::Scheduler;
use crate::script::{Script, Step};
use crate::simulation::{reduce, Action, SimState, StepContext};
use crate::task::{Generation, TaskKind};
use crate::time::Timestamp;
use crate::topology::{HostId, Topology};

pub struct Simulator {
    topology: Topology,
    script: Script,
    config: SimConfig,
    state: SimState,
    scheduler: Scheduler,
    /// Latest timestamp seen from the refresh trigger.
    clock: Timestamp,
    /// Generation of the running auto-play interval, if playing.
    autoplay: Option<Generation>,
    autoplay_gen: Generation,
}

impl Simulator {
    /// Build a simulator for the topology's tagged sender and target.
    ///
    /// Fails fast if the config is out of range or the topology lacks
    /// either participant.
    pub fn new(topology: Topology, config: SimConfig) -> SimResult<Self> {
        let script = Script::from_roles(&topology)?;
        Self::with_script(topology, script, config)
    }

    /// Build a simulator for explicitly named participants.
    pub fn with_participants(
        topology: Topology,
        sender: &HostId,
        target: &HostId,
        config: SimConfig,
    ) -> SimResult<Self> {
        let script = Script::generate(&topology, sender, target)?;
        Self::with_script(topology, script, config)
    }

    fn with_script(topology: Topology, script: Script, config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        let state = SimState::initial(&topology, &config);
        info!(
            sender = %script.sender().id,
            target = %script.target().id,
            hosts = topology.hosts().len(),
            "simulator ready"
        );
        Ok(Simulator {
            topology,
            script,
            config,
            state,
            scheduler: Scheduler::new(),
            clock: Timestamp::ZERO,
            autoplay: None,
            autoplay_gen: Generation::default(),
        })
    }

    // ── Read-only views ───────────────────────────────────────

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.script.get(self.state.index())
    }

    pub fn step_index(&self) -> usize {
        self.state.index()
    }

    /// Snapshot of one host's cache.
    pub fn cache(&self, host: &HostId) -> CacheTable {
        self.state.cache(host)
    }

    /// Event log, newest first.
    pub fn event_log(&self) -> Vec<LogEntry> {
        self.state.log().to_vec()
    }

    pub fn animation_state(&self) -> Option<&AnimationState> {
        self.state.animation()
    }

    pub fn progress(&self) -> f64 {
        self.state.progress()
    }

    /// Decode of the frame carried by the current or most recent
    /// transmission step.
    pub fn describe_selected_frame(&self) -> Option<FrameDescription> {
        self.state.inspected_frame().map(describe)
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn now(&self) -> Timestamp {
        self.clock
    }

    pub fn is_playing(&self) -> bool {
        self.autoplay.is_some()
    }

    // ── Cursor transitions ────────────────────────────────────

    pub fn advance(&mut self) {
        self.transition(Action::Advance);
    }

    pub fn retreat(&mut self) {
        self.transition(Action::Retreat);
    }

    pub fn jump_to(&mut self, index: usize) {
        self.transition(Action::JumpTo(index));
    }

    /// Stop auto-play and return to a pristine step 0.
    pub fn reset(&mut self) {
        self.pause();
        self.transition(Action::Reset);
        info!("simulation reset");
    }

    // ── Auto-play ─────────────────────────────────────────────

    /// Start advancing every `auto_advance_interval_ms`. Does nothing when
    /// already playing or already on the last step.
    ///
    /// The first interval is measured from the next `on_frame` call, not
    /// from the last refresh seen, which may be arbitrarily old.
    pub fn play(&mut self) {
        if self.autoplay.is_some() || self.at_end() {
            return;
        }
        self.autoplay_gen = self.autoplay_gen.next();
        self.autoplay = Some(self.autoplay_gen);
        info!(generation = %self.autoplay_gen, "auto-play started");
    }

    pub fn pause(&mut self) {
        if self.autoplay.take().is_some() {
            self.scheduler.cancel(TaskKind::AutoAdvance);
            info!("auto-play stopped");
        }
    }

    // ── Refresh loop ──────────────────────────────────────────

    /// Display-refresh callback. Dispatches every task due at `now` and
    /// returns how many were applied (stale ones are not counted).
    pub fn on_frame(&mut self, now: Timestamp) -> usize {
        self.clock = self.clock.max(now);
        let mut applied = 0;

        if self.autoplay.is_some() && !self.scheduler.has_pending(TaskKind::AutoAdvance) {
            self.schedule_auto_advance();
        }

        for task in self.scheduler.drain_due(self.clock) {
            match task.kind {
                TaskKind::AnimationFrame => {
                    if task.generation != self.state.generation() {
                        trace!(generation = %task.generation, "dropping stale animation frame");
                        continue;
                    }
                    self.dispatch(Action::Tick(task.generation));
                    applied += 1;
                    if self.state.animation().is_some_and(AnimationState::is_running) {
                        self.scheduler
                            .schedule(self.clock, task.generation, TaskKind::AnimationFrame);
                    }
                }
                TaskKind::AutoAdvance => {
                    if self.autoplay != Some(task.generation) {
                        trace!(generation = %task.generation, "dropping stale auto-advance");
                        continue;
                    }
                    self.transition(Action::Advance);
                    applied += 1;
                    if self.at_end() {
                        self.autoplay = None;
                        info!(index = self.state.index(), "auto-play reached the last step");
                    } else {
                        // Measured from dispatch, so a late refresh never
                        // leaves a backlog of overdue advances.
                        self.schedule_auto_advance();
                    }
                }
            }
        }
        applied
    }

    // ── Internals ─────────────────────────────────────────────

    fn at_end(&self) -> bool {
        self.state.is_started() && self.state.index() >= self.script.last_index()
    }

    fn schedule_auto_advance(&mut self) {
        if let (Some(generation), Some(at)) = (
            self.autoplay,
            self.clock.plus(self.config.auto_advance_interval_ms),
        ) {
            self.scheduler.schedule(at, generation, TaskKind::AutoAdvance);
        }
    }

    fn dispatch(&mut self, action: Action) {
        let ctx = StepContext {
            topology: &self.topology,
            script: &self.script,
            config: &self.config,
            now: self.clock,
        };
        self.state = reduce(&ctx, &self.state, action);
    }

    /// Apply a cursor action and restart the tick loop if it moved.
    fn transition(&mut self, action: Action) {
        let before = self.state.generation();
        self.dispatch(action);
        if self.state.generation() == before {
            return;
        }

        let cancelled = self.scheduler.cancel(TaskKind::AnimationFrame);
        debug!(
            ?action,
            index = self.state.index(),
            cancelled,
            "cursor moved"
        );
        if self.state.animation().is_some_and(AnimationState::is_running) {
            self.scheduler
                .schedule(self.clock, self.state.generation(), TaskKind::AnimationFrame);
        }
    }

    // ── JSON Export ───────────────────────────────────────────

    /// Export a snapshot of the current state as a JSON string.
    #[cfg(feature = "serialize")]
    pub fn state_json(&self) -> String {
        use std::collections::BTreeMap;

        use crate::animation::Leg;
        use crate::mapper::PhasePosition;

        #[derive(serde::Serialize)]
        struct AnimationView<'a> {
            state: &'a AnimationState,
            position: PhasePosition,
            legs: Vec<Leg>,
        }

        #[derive(serde::Serialize)]
        struct ApiState<'a> {
            now: u64,
            step_index: usize,
            step: Option<&'a Step>,
            started: bool,
            playing: bool,
            progress: f64,
            caches: BTreeMap<&'a str, CacheTable>,
            animation: Option<AnimationView<'a>>,
            selected_frame: Option<FrameDescription>,
        }

        let caches = self
            .state
            .caches()
            .hosts()
            .map(|id| (id.as_str(), self.state.cache(id)))
            .collect();

        let animation = self.state.animation().map(|a| AnimationView {
            state: a,
            position: a.position(),
            legs: a.legs(),
        });

        let state = ApiState {
            now: self.clock.millis(),
            step_index: self.state.index(),
            step: self.current_step(),
            started: self.state.is_started(),
            playing: self.is_playing(),
            progress: self.progress(),
            caches,
            animation,
            selected_frame: self.describe_selected_frame(),
        };

        serde_json::to_string_pretty(&state).unwrap_or_else(|_| "{}".into())
    }

    /// Export the event log (newest first) as a JSON array string.
    #[cfg(feature = "serialize")]
    pub fn event_log_json(&self) -> String {
        serde_json::to_string_pretty(&self.event_log()).unwrap_or_else(|_| "[]".into())
    }

    /// Export the script as a JSON array string.
    #[cfg(feature = "serialize")]
    pub fn script_json(&self) -> String {
        serde_json::to_string_pretty(self.script.steps()).unwrap_or_else(|_| "[]".into())
    }
}
