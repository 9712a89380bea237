//! # ARP Stepper: Step-Driven ARP Exchange Simulator
//!
//! A teaching engine that walks a learner through one host resolving a
//! peer's hardware address across a switch, one discrete event at a time.
//! No real network I/O happens: frames are synthesized values, caches are
//! plain maps, and time comes from the host's display-refresh callback.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────┐
//! │        Simulator          │ ← cursor control, refresh loop, views
//! │  ┌────────────────────┐  │
//! │  │      reduce         │  │ ← SimState × Action → SimState
//! │  │  ┌──────────────┐  │  │
//! │  │  │   Script      │  │  │ ← eight fixed steps, frames inside
//! │  │  └──────────────┘  │  │
//! │  │  ┌──────────────┐  │  │
//! │  │  │  CacheStore   │  │  │ ← per-host ip → mac
//! │  │  └──────────────┘  │  │
//! │  │  ┌──────────────┐  │  │
//! │  │  │  Animation    │  │  │ ← progress + phase mapping
//! │  │  └──────────────┘  │  │
//! │  └────────────────────┘  │
//! │  ┌────────────────────┐  │
//! │  │     Scheduler       │  │ ← ticks + auto-advance, generation-guarded
//! │  └────────────────────┘  │
//! └──────────────────────────┘
//! ```

pub mod animation;
pub mod api;
pub mod cache;
pub mod config;
pub mod dsl;
pub mod error;
pub mod eventlog;
pub mod frame;
pub mod mapper;
pub mod scheduler;
pub mod script;
pub mod simulation;
pub mod task;
pub mod time;
pub mod topology;
pub mod wasm;

// Re-exports for convenience.
pub use animation::{AnimationState, DeliveryMode, TickOutcome, Timeline};
pub use api::Simulator;
pub use cache::{CacheStore, CacheTable};
pub use config::{ScenarioFile, SimConfig};
pub use dsl::ScenarioBuilder;
pub use error::{SimError, SimResult};
pub use eventlog::{EventLog, LogEntry};
pub use frame::{build_reply, build_request, describe, Frame, FrameDescription, Opcode};
pub use mapper::{map_progress, Phase, PhasePosition};
pub use script::{Script, Step, StepKind};
pub use simulation::{reduce, Action, SimState, StepContext};
pub use task::Generation;
pub use time::Timestamp;
pub use topology::{Endpoint, Host, HostId, Position, Role, Topology};
