//! The fixed eight-step resolution narrative.
//!
//! A `Script` is generated once from the topology and never edited. The
//! running simulation only moves a cursor over it.

use crate::error::{SimError, SimResult};
use crate::frame::{build_reply, build_request, Frame};
use crate::topology::{Endpoint, HostId, Topology};

/// Kind of a step. Transmission steps carry their frame.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(tag = "kind", rename_all = "kebab-case"))]
pub enum StepKind {
    ScenarioStart,
    CacheLookup,
    CacheMiss,
    ArpRequest { frame: Frame },
    PeerReceived,
    ArpReply { frame: Frame },
    CacheUpdate,
    CacheHit,
}

impl StepKind {
    /// Stable kebab-case tag, e.g. `arp-request`.
    pub fn tag(&self) -> &'static str {
        match self {
            StepKind::ScenarioStart => "scenario-start",
            StepKind::CacheLookup => "cache-lookup",
            StepKind::CacheMiss => "cache-miss",
            StepKind::ArpRequest { .. } => "arp-request",
            StepKind::PeerReceived => "peer-received",
            StepKind::ArpReply { .. } => "arp-reply",
            StepKind::CacheUpdate => "cache-update",
            StepKind::CacheHit => "cache-hit",
        }
    }
}

/// One entry of the script.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Step {
    pub title: String,
    #[cfg_attr(feature = "serialize", serde(flatten))]
    pub kind: StepKind,
}

impl Step {
    fn new(title: String, kind: StepKind) -> Self {
        Step { title, kind }
    }

    /// The frame put on the wire by this step, if any.
    pub fn frame(&self) -> Option<&Frame> {
        match &self.kind {
            StepKind::ArpRequest { frame } | StepKind::ArpReply { frame } => Some(frame),
            _ => None,
        }
    }

    pub fn is_transmission(&self) -> bool {
        self.frame().is_some()
    }
}

/// The ordered list of steps plus the two participants it was built for.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Script {
    sender: Endpoint,
    target: Endpoint,
    steps: Vec<Step>,
}

impl Script {
    /// Build the narrative for `sender` resolving `target`.
    ///
    /// Fails only if either ID is unknown, is a switch, or both name the
    /// same host.
    pub fn generate(topology: &Topology, sender: &HostId, target: &HostId) -> SimResult<Self> {
        let sender = topology.endpoint(sender)?;
        let target = topology.endpoint(target)?;
        if sender.id == target.id {
            return Err(SimError::SameParticipant(sender.id));
        }
        Ok(Self::for_participants(sender, target))
    }

    /// Build the narrative for the topology's tagged sender and target.
    pub fn from_roles(topology: &Topology) -> SimResult<Self> {
        let (sender, target) = topology.participants()?;
        Ok(Self::for_participants(sender, target))
    }

    fn for_participants(sender: Endpoint, target: Endpoint) -> Self {
        let request = build_request(&sender, &target.ip);
        let reply = build_reply(&target, &sender);

        let steps = vec![
            Step::new(
                format!("{} wants to talk to {}", sender.name, target.ip),
                StepKind::ScenarioStart,
            ),
            Step::new(
                format!("{} checks its ARP cache for {}", sender.name, target.ip),
                StepKind::CacheLookup,
            ),
            Step::new(
                format!("Cache miss: {} is unresolved", target.ip),
                StepKind::CacheMiss,
            ),
            Step::new(
                format!("{} broadcasts an ARP request", sender.name),
                StepKind::ArpRequest { frame: request },
            ),
            Step::new(
                format!("{} recognizes its own address", target.name),
                StepKind::PeerReceived,
            ),
            Step::new(
                format!("{} sends a unicast ARP reply", target.name),
                StepKind::ArpReply { frame: reply },
            ),
            Step::new(
                format!("{} and {} update their caches", sender.name, target.name),
                StepKind::CacheUpdate,
            ),
            Step::new(
                format!("Cache hit: {} resolves {} locally", sender.name, target.ip),
                StepKind::CacheHit,
            ),
        ];

        Script {
            sender,
            target,
            steps,
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Highest valid cursor position.
    pub fn last_index(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    pub fn sender(&self) -> &Endpoint {
        &self.sender
    }

    pub fn target(&self) -> &Endpoint {
        &self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Opcode, BROADCAST_MAC, ZERO_MAC};

    fn classroom_script() -> Script {
        Script::generate(&Topology::classroom(), &HostId::new("PC1"), &HostId::new("PC3")).unwrap()
    }

    #[test]
    fn test_fixed_order() {
        let script = classroom_script();
        let tags: Vec<&str> = script.steps().iter().map(|s| s.kind.tag()).collect();
        assert_eq!(
            tags,
            vec![
                "scenario-start",
                "cache-lookup",
                "cache-miss",
                "arp-request",
                "peer-received",
                "arp-reply",
                "cache-update",
                "cache-hit",
            ]
        );
        assert_eq!(script.len(), 8);
        assert_eq!(script.last_index(), 7);
    }

    #[test]
    fn test_only_request_and_reply_carry_frames() {
        let script = classroom_script();
        let with_frames: Vec<usize> = script
            .steps()
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_transmission())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(with_frames, vec![3, 5]);
    }

    #[test]
    fn test_request_and_reply_frames() {
        let script = classroom_script();

        let request = script.get(3).and_then(Step::frame).unwrap();
        assert_eq!(request.opcode(), Opcode::REQUEST);
        assert_eq!(request.eth.dst_mac, BROADCAST_MAC);
        assert_eq!(request.arp.target_mac, ZERO_MAC);
        assert_eq!(request.arp.target_ip, "192.168.1.30");

        let reply = script.get(5).and_then(Step::frame).unwrap();
        assert_eq!(reply.opcode(), Opcode::REPLY);
        assert_eq!(reply.eth.dst_mac, script.sender().mac);
        assert_eq!(reply.arp.sender_mac, script.target().mac);
    }

    #[test]
    fn test_generation_is_deterministic() {
        assert_eq!(classroom_script(), classroom_script());
    }

    #[test]
    fn test_from_roles_matches_explicit_ids() {
        let by_roles = Script::from_roles(&Topology::classroom()).unwrap();
        assert_eq!(by_roles, classroom_script());
    }

    #[test]
    fn test_same_participant_rejected() {
        let err = Script::generate(&Topology::classroom(), &HostId::new("PC1"), &HostId::new("PC1"))
            .unwrap_err();
        assert_eq!(err, SimError::SameParticipant(HostId::new("PC1")));
    }

    #[test]
    fn test_switch_cannot_be_target() {
        let err = Script::generate(&Topology::classroom(), &HostId::new("PC1"), &HostId::new("SW1"))
            .unwrap_err();
        assert_eq!(err, SimError::NotAnEndHost(HostId::new("SW1")));
    }
}
