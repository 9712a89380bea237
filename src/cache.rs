//! Per-host ARP caches.
//!
//! A `CacheStore` is a value: `update` hands back a new store and leaves the
//! original untouched, so a simulation snapshot can hold one without any
//! aliasing. Entries are only ever added, never expired.

use std::collections::BTreeMap;

use crate::topology::{HostId, Topology};

/// Network address → hardware address for one host.
pub type CacheTable = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheStore {
    tables: BTreeMap<HostId, CacheTable>,
}

impl CacheStore {
    /// An empty table for every end host in the topology.
    pub fn new(topology: &Topology) -> Self {
        CacheStore {
            tables: topology
                .end_hosts()
                .map(|h| (h.id.clone(), CacheTable::new()))
                .collect(),
        }
    }

    /// The resolved hardware address, or `None` while unresolved.
    pub fn lookup(&self, host: &HostId, ip: &str) -> Option<&str> {
        self.tables
            .get(host)
            .and_then(|t| t.get(ip))
            .map(String::as_str)
    }

    /// A copy of this store with `ip → mac` recorded for `host`.
    ///
    /// Repeating the same update yields an equal store.
    #[must_use]
    pub fn update(&self, host: &HostId, ip: &str, mac: &str) -> CacheStore {
        let mut next = self.clone();
        next.tables
            .entry(host.clone())
            .or_default()
            .insert(ip.to_string(), mac.to_string());
        next
    }

    /// `true` if `host` has no entries (or is unknown to the store).
    pub fn is_empty(&self, host: &HostId) -> bool {
        self.tables.get(host).map_or(true, CacheTable::is_empty)
    }

    /// Read-only view of one host's table.
    pub fn table(&self, host: &HostId) -> Option<&CacheTable> {
        self.tables.get(host)
    }

    /// Owned copy of one host's table; empty for unknown hosts.
    pub fn snapshot(&self, host: &HostId) -> CacheTable {
        self.tables.get(host).cloned().unwrap_or_default()
    }

    /// Same hosts, no entries.
    #[must_use]
    pub fn cleared(&self) -> CacheStore {
        CacheStore {
            tables: self
                .tables
                .keys()
                .map(|id| (id.clone(), CacheTable::new()))
                .collect(),
        }
    }

    /// Hosts that own a table, in ID order.
    pub fn hosts(&self) -> impl Iterator<Item = &HostId> {
        self.tables.keys()
    }
}
