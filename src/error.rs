//! Structured error types for the ARP stepper.
//!
//! Only construction can fail: a topology that lacks its sender or target,
//! or a config with out-of-range timing values. Everything the simulation
//! does after that (cursor moves, ticks, cache lookups) is total.

use crate::topology::{HostId, Role};

/// The top-level error type for the simulator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    // ── Topology errors ───────────────────────────────────

    /// A host ID was referenced but is not part of the topology.
    #[error("host {0} not found in topology")]
    HostNotFound(HostId),

    /// Two hosts share the same identifier.
    #[error("host {0} is declared more than once")]
    DuplicateHost(HostId),

    /// No host carries the given role tag.
    #[error("topology has no {0} host")]
    MissingRole(Role),

    /// More than one host carries the given role tag.
    #[error("topology declares more than one {0} host")]
    DuplicateRole(Role),

    /// A switch (or any host without a network address) was named as a
    /// resolution participant.
    #[error("host {0} has no network address and cannot take part in resolution")]
    NotAnEndHost(HostId),

    /// Sender and target resolve to the same host.
    #[error("sender and target must be different hosts (both are {0})")]
    SameParticipant(HostId),

    // ── Config errors ─────────────────────────────────────

    /// A timing or capacity value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A scenario or config file could not be parsed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_host_not_found() {
        let e = SimError::HostNotFound(HostId::new("PC9"));
        assert_eq!(e.to_string(), "host PC9 not found in topology");
    }

    #[test]
    fn test_error_display_missing_role() {
        let e = SimError::MissingRole(Role::Target);
        assert_eq!(e.to_string(), "topology has no target host");
    }

    #[test]
    fn test_error_display_invalid_config() {
        let e = SimError::InvalidConfig("pause_fraction must be in [0, 1]".into());
        assert!(e.to_string().starts_with("invalid configuration"));
        assert!(e.to_string().contains("pause_fraction"));
    }

    #[test]
    fn test_error_is_std_error() {
        let e: Box<dyn std::error::Error> = Box::new(SimError::SameParticipant(HostId::new("PC1")));
        assert!(e.to_string().contains("PC1"));
    }
}
