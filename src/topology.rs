//! Hosts and the fixed shared-medium topology they sit on.
//!
//! A topology is built once and never changes during a run. End hosts carry
//! a network address; switches do not. Exactly one end host is tagged as the
//! sender (the side doing the lookup) and exactly one as the target.

use std::collections::BTreeSet;

use crate::error::{SimError, SimResult};

// ── Host ID ───────────────────────────────────────────────────────────

/// Identifier of a host in the topology, e.g. `PC1` or `SW1`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(transparent))]
pub struct HostId(String);

impl HostId {
    pub fn new(id: impl Into<String>) -> Self {
        HostId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for HostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for HostId {
    fn from(s: &str) -> Self {
        HostId::new(s)
    }
}

// ── Role ──────────────────────────────────────────────────────────────

/// Part a host plays in the resolution scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "lowercase"))]
pub enum Role {
    #[default]
    None,
    /// The host that needs the hardware address.
    Sender,
    /// The host whose hardware address is being resolved.
    Target,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::None => write!(f, "none"),
            Role::Sender => write!(f, "sender"),
            Role::Target => write!(f, "target"),
        }
    }
}

// ── Host ──────────────────────────────────────────────────────────────

/// Canvas position, owned by the presentation layer. The core only carries
/// it through.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }
}

/// A node on the segment: an end host or a switch.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Host {
    pub id: HostId,
    pub name: String,
    #[cfg_attr(feature = "serialize", serde(default))]
    pub role: Role,
    /// Network address. `None` for switches.
    #[cfg_attr(feature = "serialize", serde(default))]
    pub ip: Option<String>,
    pub mac: String,
    #[cfg_attr(feature = "serialize", serde(default))]
    pub position: Position,
}

impl Host {
    /// An end host with a network address and no role.
    pub fn end_host(
        id: impl Into<String>,
        name: impl Into<String>,
        ip: impl Into<String>,
        mac: impl Into<String>,
        position: Position,
    ) -> Self {
        Host {
            id: HostId::new(id),
            name: name.into(),
            role: Role::None,
            ip: Some(ip.into()),
            mac: mac.into(),
            position,
        }
    }

    /// A switch: hardware address only.
    pub fn switch(
        id: impl Into<String>,
        name: impl Into<String>,
        mac: impl Into<String>,
        position: Position,
    ) -> Self {
        Host {
            id: HostId::new(id),
            name: name.into(),
            role: Role::None,
            ip: None,
            mac: mac.into(),
            position,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn is_switch(&self) -> bool {
        self.ip.is_none()
    }
}

// ── Endpoint ──────────────────────────────────────────────────────────

/// A resolution participant: an end host whose network address is known
/// to be present. Frame constructors take these so they never have to
/// deal with a missing address.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Endpoint {
    pub id: HostId,
    pub name: String,
    pub ip: String,
    pub mac: String,
}

impl TryFrom<&Host> for Endpoint {
    type Error = SimError;

    fn try_from(host: &Host) -> SimResult<Self> {
        let ip = host
            .ip
            .clone()
            .ok_or_else(|| SimError::NotAnEndHost(host.id.clone()))?;
        Ok(Endpoint {
            id: host.id.clone(),
            name: host.name.clone(),
            ip,
            mac: host.mac.clone(),
        })
    }
}

// ── Topology ──────────────────────────────────────────────────────────

/// The fixed set of hosts on the segment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(try_from = "TopologyDef"))]
pub struct Topology {
    hosts: Vec<Host>,
}

#[cfg(feature = "serialize")]
#[derive(serde::Deserialize)]
struct TopologyDef {
    hosts: Vec<Host>,
}

#[cfg(feature = "serialize")]
impl TryFrom<TopologyDef> for Topology {
    type Error = SimError;

    fn try_from(def: TopologyDef) -> SimResult<Self> {
        Topology::new(def.hosts)
    }
}

impl Topology {
    /// Build a topology, rejecting duplicate host IDs.
    pub fn new(hosts: Vec<Host>) -> SimResult<Self> {
        let mut seen = BTreeSet::new();
        for host in &hosts {
            if !seen.insert(host.id.clone()) {
                return Err(SimError::DuplicateHost(host.id.clone()));
            }
        }
        Ok(Topology { hosts })
    }

    /// Parse a topology from JSON.
    #[cfg(feature = "serialize")]
    pub fn from_json(json: &str) -> SimResult<Self> {
        serde_json::from_str(json).map_err(|e| SimError::Serialization(e.to_string()))
    }

    /// Four PCs on 192.168.1.0/24 behind one switch, PC1 resolving PC3.
    pub fn classroom() -> Self {
        Topology {
            hosts: vec![
                Host::end_host("PC1", "PC1", "192.168.1.10", "00:1a:2b:3c:4d:01", Position::new(120.0, 110.0))
                    .with_role(Role::Sender),
                Host::end_host("PC2", "PC2", "192.168.1.20", "00:1a:2b:3c:4d:02", Position::new(480.0, 110.0)),
                Host::end_host("PC3", "PC3", "192.168.1.30", "00:1a:2b:3c:4d:03", Position::new(480.0, 330.0))
                    .with_role(Role::Target),
                Host::end_host("PC4", "PC4", "192.168.1.40", "00:1a:2b:3c:4d:04", Position::new(120.0, 330.0)),
                Host::switch("SW1", "Switch", "00:1a:2b:3c:4d:fe", Position::new(300.0, 220.0)),
            ],
        }
    }

    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    pub fn host(&self, id: &HostId) -> Option<&Host> {
        self.hosts.iter().find(|h| &h.id == id)
    }

    /// Hosts that have a network address.
    pub fn end_hosts(&self) -> impl Iterator<Item = &Host> {
        self.hosts.iter().filter(|h| !h.is_switch())
    }

    /// The switch frames are forwarded through, if the topology has one.
    pub fn switch(&self) -> Option<&Host> {
        self.hosts.iter().find(|h| h.is_switch())
    }

    /// Resolve an ID to a participant view.
    pub fn endpoint(&self, id: &HostId) -> SimResult<Endpoint> {
        let host = self
            .host(id)
            .ok_or_else(|| SimError::HostNotFound(id.clone()))?;
        Endpoint::try_from(host)
    }

    /// The single host tagged with `role`.
    pub fn with_role(&self, role: Role) -> SimResult<Endpoint> {
        let mut tagged = self.hosts.iter().filter(|h| h.role == role);
        let host = tagged.next().ok_or(SimError::MissingRole(role))?;
        if tagged.next().is_some() {
            return Err(SimError::DuplicateRole(role));
        }
        Endpoint::try_from(host)
    }

    /// The `(sender, target)` pair declared by role tags.
    pub fn participants(&self) -> SimResult<(Endpoint, Endpoint)> {
        let sender = self.with_role(Role::Sender)?;
        let target = self.with_role(Role::Target)?;
        if sender.id == target.id {
            return Err(SimError::SameParticipant(sender.id));
        }
        Ok((sender, target))
    }

    /// Every end host except `from`, in topology order.
    pub fn broadcast_destinations(&self, from: &HostId) -> Vec<HostId> {
        self.end_hosts()
            .filter(|h| &h.id != from)
            .map(|h| h.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classroom_participants() {
        let topo = Topology::classroom();
        let (sender, target) = topo.participants().unwrap();
        assert_eq!(sender.id, HostId::new("PC1"));
        assert_eq!(sender.ip, "192.168.1.10");
        assert_eq!(target.id, HostId::new("PC3"));
        assert_eq!(target.ip, "192.168.1.30");
    }

    #[test]
    fn test_broadcast_destinations_skip_sender_and_switch() {
        let topo = Topology::classroom();
        let dests = topo.broadcast_destinations(&HostId::new("PC1"));
        assert_eq!(
            dests,
            vec![HostId::new("PC2"), HostId::new("PC3"), HostId::new("PC4")]
        );
    }

    #[test]
    fn test_duplicate_host_rejected() {
        let hosts = vec![
            Host::end_host("PC1", "a", "10.0.0.1", "aa", Position::default()),
            Host::end_host("PC1", "b", "10.0.0.2", "bb", Position::default()),
        ];
        assert_eq!(
            Topology::new(hosts),
            Err(SimError::DuplicateHost(HostId::new("PC1")))
        );
    }

    #[test]
    fn test_missing_target_fails_fast() {
        let topo = Topology::new(vec![
            Host::end_host("PC1", "PC1", "10.0.0.1", "aa", Position::default())
                .with_role(Role::Sender),
            Host::end_host("PC2", "PC2", "10.0.0.2", "bb", Position::default()),
        ])
        .unwrap();
        assert_eq!(topo.participants(), Err(SimError::MissingRole(Role::Target)));
    }

    #[test]
    fn test_duplicate_role_rejected() {
        let topo = Topology::new(vec![
            Host::end_host("PC1", "PC1", "10.0.0.1", "aa", Position::default())
                .with_role(Role::Sender),
            Host::end_host("PC2", "PC2", "10.0.0.2", "bb", Position::default())
                .with_role(Role::Sender),
        ])
        .unwrap();
        assert_eq!(topo.participants(), Err(SimError::DuplicateRole(Role::Sender)));
    }

    #[test]
    fn test_switch_is_not_an_endpoint() {
        let topo = Topology::classroom();
        assert_eq!(
            topo.endpoint(&HostId::new("SW1")),
            Err(SimError::NotAnEndHost(HostId::new("SW1")))
        );
        assert_eq!(topo.switch().map(|h| h.id.as_str()), Some("SW1"));
    }

    #[test]
    fn test_unknown_host() {
        let topo = Topology::classroom();
        assert_eq!(
            topo.endpoint(&HostId::new("PC9")),
            Err(SimError::HostNotFound(HostId::new("PC9")))
        );
    }

    #[cfg(feature = "serialize")]
    #[test]
    fn test_from_json_validates() {
        let json = r#"{
            "hosts": [
                {"id": "A", "name": "A", "role": "sender", "ip": "10.0.0.1", "mac": "aa:aa:aa:aa:aa:01"},
                {"id": "A", "name": "B", "role": "target", "ip": "10.0.0.2", "mac": "aa:aa:aa:aa:aa:02"}
            ]
        }"#;
        let err = Topology::from_json(json).unwrap_err();
        assert!(matches!(err, SimError::Serialization(msg) if msg.contains("declared more than once")));
    }

    #[cfg(feature = "serialize")]
    #[test]
    fn test_from_json_round_trip_of_classroom() {
        let json = serde_json::to_string(&Topology::classroom()).unwrap();
        let topo = Topology::from_json(&json).unwrap();
        assert_eq!(topo, Topology::classroom());
    }
}
