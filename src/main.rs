//! ARP Stepper CLI
//!
//! Walks the resolution scenario headlessly, printing each step's log
//! lines, the cache tables and the animation phases on a virtual refresh
//! clock.
//!
//! # Example
//!
//! ```bash
//! # Step through the built-in classroom LAN, showing frame decodes
//! arp-stepper --frames
//!
//! # Auto-play a custom scenario and dump the final state
//! arp-stepper --scenario lab.json --auto --json
//! ```

use std::path::PathBuf;

use anyhow::Context;
use arp_stepper::{Phase, ScenarioFile, Simulator, Timestamp};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// ARP Stepper
///
/// Deterministic, step-by-step ARP resolution across a switch.
#[derive(Parser, Debug)]
#[command(name = "arp-stepper")]
#[command(version, about, long_about = None)]
struct Args {
    /// Scenario JSON file (topology plus optional config). Defaults to the
    /// four-PC classroom LAN.
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Drive the run with auto-play instead of manual steps
    #[arg(long)]
    auto: bool,

    /// Print the frame decode for transmission steps
    #[arg(long)]
    frames: bool,

    /// Print the final state snapshot as JSON
    #[arg(long)]
    json: bool,

    /// Virtual refresh period in milliseconds
    #[arg(long, default_value = "16")]
    frame_ms: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,arp_stepper=info")),
        )
        .init();

    let args = Args::parse();

    let file = match &args.scenario {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading scenario {}", path.display()))?;
            ScenarioFile::from_json(&json)
                .with_context(|| format!("parsing scenario {}", path.display()))?
        }
        None => ScenarioFile::classroom(),
    };

    let mut sim = Simulator::new(file.topology, file.config).context("building simulator")?;
    let mut walk = Walk::new(&args);

    println!("═══════════════════════════════════════════════════════");
    println!("  ARP Stepper: {} resolves {}", sim.script().sender().name, sim.script().target().ip);
    println!("═══════════════════════════════════════════════════════");

    if args.auto {
        info!("auto-play mode");
        sim.play();
        let mut last_index = None;
        while sim.is_playing() || animating(&sim) {
            walk.feed(&mut sim);
            if sim.state().is_started() && last_index != Some(sim.step_index()) {
                last_index = Some(sim.step_index());
                walk.print_step(&sim);
            }
            walk.report_phase(&sim);
        }
    } else {
        for _ in 0..sim.script().len() {
            sim.advance();
            walk.print_step(&sim);
            while animating(&sim) {
                walk.feed(&mut sim);
                walk.report_phase(&sim);
            }
        }
    }

    println!();
    println!("  Final caches:");
    print_caches(&sim);

    if args.json {
        println!();
        println!("{}", sim.state_json());
    }

    Ok(())
}

fn animating(sim: &Simulator) -> bool {
    sim.animation_state().is_some_and(|a| a.is_running())
}

/// Virtual clock plus printing state for one run.
struct Walk {
    now: u64,
    frame_ms: u64,
    frames: bool,
    logged: usize,
    last_phase: Option<Phase>,
}

impl Walk {
    fn new(args: &Args) -> Self {
        Walk {
            now: 0,
            frame_ms: args.frame_ms.max(1),
            frames: args.frames,
            logged: 0,
            last_phase: None,
        }
    }

    /// Feed one refresh into the simulator.
    fn feed(&mut self, sim: &mut Simulator) {
        sim.on_frame(Timestamp::from_millis(self.now));
        self.now += self.frame_ms;
    }

    fn report_phase(&mut self, sim: &Simulator) {
        match sim.animation_state() {
            Some(anim) => {
                let phase = anim.position().phase;
                if self.last_phase != Some(phase) {
                    self.last_phase = Some(phase);
                    let to: Vec<&str> = anim.to.iter().map(|h| h.as_str()).collect();
                    println!(
                        "      {:>6}ms  {} {} -> {}: {}",
                        sim.now().millis(),
                        anim.mode,
                        anim.from,
                        to.join(", "),
                        phase
                    );
                }
            }
            None => self.last_phase = None,
        }
    }

    fn print_step(&mut self, sim: &Simulator) {
        let Some(step) = sim.current_step() else {
            return;
        };
        println!();
        println!("  [{}] {}", sim.step_index(), step.title);

        let log = sim.event_log();
        let fresh = log.len().saturating_sub(self.logged);
        for entry in log.iter().take(fresh).rev() {
            println!("      {}", entry);
        }
        self.logged = log.len();

        if self.frames && step.is_transmission() {
            if let Some(d) = sim.describe_selected_frame() {
                for line in d.link_layer.lines().chain(d.arp.lines()) {
                    println!("        {}", line);
                }
            }
        }
    }
}

fn print_caches(sim: &Simulator) {
    for host in sim.topology().end_hosts() {
        let table = sim.cache(&host.id);
        if table.is_empty() {
            println!("    {:<6} (empty)", host.id);
            continue;
        }
        for (ip, mac) in &table {
            println!("    {:<6} {:<15} {}", host.id, ip, mac);
        }
    }
}
