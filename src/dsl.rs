/// Fluent builder for scenario setup.
///
/// Hides the boilerplate of assembling hosts, tagging the sender and
/// target, and validating the result into a ready `Simulator`.

use crate::api::Simulator;
use crate::config::SimConfig;
use crate::error::SimResult;
use crate::topology::{Host, HostId, Position, Role, Topology};

/// Fluent builder for a `Topology` + `Simulator` pair.
///
/// # Example
/// ```rust
/// use arp_stepper::dsl::ScenarioBuilder;
///
/// let sim = ScenarioBuilder::new()
///     .end_host("A", "192.168.0.1", "02:00:00:00:00:01")
///     .end_host("B", "192.168.0.2", "02:00:00:00:00:02")
///     .switch("SW", "02:00:00:00:00:fe")
///     .sender("A")
///     .target("B")
///     .build()
///     .unwrap();
/// assert_eq!(sim.script().len(), 8);
/// ```
pub struct ScenarioBuilder {
    hosts: Vec<Host>,
    sender: Option<HostId>,
    target: Option<HostId>,
    config: SimConfig,
}

impl ScenarioBuilder {
    pub fn new() -> Self {
        ScenarioBuilder {
            hosts: Vec::new(),
            sender: None,
            target: None,
            config: SimConfig::default(),
        }
    }

    /// Start from the four-PC classroom LAN.
    pub fn classroom() -> Self {
        ScenarioBuilder {
            hosts: Topology::classroom().hosts().to_vec(),
            ..Self::new()
        }
    }

    // ── Hosts ─────────────────────────────────────────────────

    /// Add an end host named after its ID.
    pub fn end_host(self, id: &str, ip: &str, mac: &str) -> Self {
        self.host(Host::end_host(id, id, ip, mac, Position::default()))
    }

    /// Add a switch named after its ID.
    pub fn switch(self, id: &str, mac: &str) -> Self {
        self.host(Host::switch(id, id, mac, Position::default()))
    }

    /// Add a fully specified host.
    pub fn host(mut self, host: Host) -> Self {
        self.hosts.push(host);
        self
    }

    /// Move a host on the canvas.
    pub fn at(mut self, id: &str, x: f64, y: f64) -> Self {
        if let Some(host) = self.hosts.iter_mut().find(|h| h.id.as_str() == id) {
            host.position = Position::new(x, y);
        }
        self
    }

    // ── Roles ─────────────────────────────────────────────────

    pub fn sender(mut self, id: &str) -> Self {
        self.sender = Some(HostId::new(id));
        self
    }

    pub fn target(mut self, id: &str) -> Self {
        self.target = Some(HostId::new(id));
        self
    }

    // ── Config ────────────────────────────────────────────────

    pub fn config(mut self, config: SimConfig) -> Self {
        self.config = config;
        self
    }

    pub fn transmit_duration(mut self, ms: u64) -> Self {
        self.config.transmit_duration_ms = ms;
        self
    }

    pub fn auto_advance_interval(mut self, ms: u64) -> Self {
        self.config.auto_advance_interval_ms = ms;
        self
    }

    // ── Build ─────────────────────────────────────────────────

    /// Assemble the topology. Explicit `sender`/`target` calls replace any
    /// role tags already on the hosts.
    pub fn topology(&self) -> SimResult<Topology> {
        let mut hosts = self.hosts.clone();
        for (role, id) in [(Role::Sender, &self.sender), (Role::Target, &self.target)] {
            if let Some(id) = id {
                for host in hosts.iter_mut() {
                    if &host.id == id {
                        host.role = role;
                    } else if host.role == role {
                        host.role = Role::None;
                    }
                }
            }
        }
        Topology::new(hosts)
    }

    pub fn build(self) -> SimResult<Simulator> {
        let topology = self.topology()?;
        for id in [&self.sender, &self.target].into_iter().flatten() {
            topology.endpoint(id)?;
        }
        Simulator::new(topology, self.config)
    }
}

impl Default for ScenarioBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;

    #[test]
    fn test_builder_two_hosts() {
        let sim = ScenarioBuilder::new()
            .end_host("A", "10.0.0.1", "02:00:00:00:00:01")
            .end_host("B", "10.0.0.2", "02:00:00:00:00:02")
            .switch("SW", "02:00:00:00:00:fe")
            .sender("A")
            .target("B")
            .build()
            .unwrap();

        assert_eq!(sim.script().sender().ip, "10.0.0.1");
        assert_eq!(sim.script().target().ip, "10.0.0.2");
        assert_eq!(sim.topology().broadcast_destinations(&HostId::new("A")).len(), 1);
    }

    #[test]
    fn test_builder_retags_classroom() {
        let sim = ScenarioBuilder::classroom()
            .sender("PC2")
            .target("PC4")
            .build()
            .unwrap();
        assert_eq!(sim.script().sender().id, HostId::new("PC2"));
        assert_eq!(sim.script().target().id, HostId::new("PC4"));
    }

    #[test]
    fn test_builder_missing_target() {
        let err = ScenarioBuilder::new()
            .end_host("A", "10.0.0.1", "aa")
            .sender("A")
            .build()
            .err();
        assert_eq!(err, Some(SimError::MissingRole(Role::Target)));
    }

    #[test]
    fn test_builder_unknown_sender() {
        let err = ScenarioBuilder::classroom().sender("PC9").build().err();
        assert_eq!(err, Some(SimError::HostNotFound(HostId::new("PC9"))));
    }

    #[test]
    fn test_builder_config_knobs() {
        let sim = ScenarioBuilder::classroom()
            .transmit_duration(600)
            .auto_advance_interval(700)
            .build()
            .unwrap();
        assert_eq!(sim.config().transmit_duration_ms, 600);
        assert_eq!(sim.config().auto_advance_interval_ms, 700);
    }

    #[test]
    fn test_builder_position() {
        let topo = ScenarioBuilder::new()
            .end_host("A", "10.0.0.1", "aa")
            .at("A", 3.0, 4.0)
            .topology()
            .unwrap();
        assert_eq!(topo.hosts()[0].position, Position::new(3.0, 4.0));
    }
}
