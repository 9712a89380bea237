//! Ethernet + ARP frame model.
//!
//! Frames are immutable values built from two participants. Addresses are
//! kept as formatted strings: nothing here is ever packed onto a wire.

use std::borrow::Cow;

use crate::topology::Endpoint;

/// Link-layer broadcast address.
pub const BROADCAST_MAC: &str = "ff:ff:ff:ff:ff:ff";

/// Placeholder target hardware address carried by requests.
pub const ZERO_MAC: &str = "00:00:00:00:00:00";

/// Protocol-type tag carried in the link-layer header.
pub const ETHERTYPE_ARP: &str = "ARP";

const HTYPE_ETHERNET: u16 = 1;
const PTYPE_IPV4: u16 = 0x0800;
const HLEN_ETHERNET: u8 = 6;
const PLEN_IPV4: u8 = 4;

// ── Opcode ────────────────────────────────────────────────────────────

/// ARP operation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(transparent))]
pub struct Opcode(u16);

impl Opcode {
    pub const REQUEST: Opcode = Opcode(1);
    pub const REPLY: Opcode = Opcode(2);

    pub fn new(raw: u16) -> Self {
        Opcode(raw)
    }

    pub fn raw(self) -> u16 {
        self.0
    }

    /// `request`, `reply`, or the numeric value for anything else.
    pub fn name(self) -> Cow<'static, str> {
        match self {
            Opcode::REQUEST => Cow::Borrowed("request"),
            Opcode::REPLY => Cow::Borrowed("reply"),
            Opcode(other) => Cow::Owned(other.to_string()),
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.0)
    }
}

// ── Frame ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct EthernetHeader {
    pub dst_mac: String,
    pub src_mac: String,
    pub ethertype: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ArpPayload {
    pub htype: u16,
    pub ptype: u16,
    pub hlen: u8,
    pub plen: u8,
    pub opcode: Opcode,
    pub sender_mac: String,
    pub sender_ip: String,
    /// All-zero for requests.
    pub target_mac: String,
    pub target_ip: String,
}

/// An Ethernet frame carrying an ARP message.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Frame {
    pub eth: EthernetHeader,
    pub arp: ArpPayload,
}

impl Frame {
    pub fn opcode(&self) -> Opcode {
        self.arp.opcode
    }

    pub fn is_request(&self) -> bool {
        self.arp.opcode == Opcode::REQUEST
    }

    pub fn is_reply(&self) -> bool {
        self.arp.opcode == Opcode::REPLY
    }

    /// Whether the link-layer destination is the broadcast address.
    pub fn is_broadcast(&self) -> bool {
        self.eth.dst_mac == BROADCAST_MAC
    }
}

/// Who-has request from `sender` for `target_ip`.
pub fn build_request(sender: &Endpoint, target_ip: &str) -> Frame {
    Frame {
        eth: EthernetHeader {
            dst_mac: BROADCAST_MAC.to_string(),
            src_mac: sender.mac.clone(),
            ethertype: ETHERTYPE_ARP.to_string(),
        },
        arp: ArpPayload {
            htype: HTYPE_ETHERNET,
            ptype: PTYPE_IPV4,
            hlen: HLEN_ETHERNET,
            plen: PLEN_IPV4,
            opcode: Opcode::REQUEST,
            sender_mac: sender.mac.clone(),
            sender_ip: sender.ip.clone(),
            target_mac: ZERO_MAC.to_string(),
            target_ip: target_ip.to_string(),
        },
    }
}

/// Is-at reply from `target` addressed straight back to `requester`.
pub fn build_reply(target: &Endpoint, requester: &Endpoint) -> Frame {
    Frame {
        eth: EthernetHeader {
            dst_mac: requester.mac.clone(),
            src_mac: target.mac.clone(),
            ethertype: ETHERTYPE_ARP.to_string(),
        },
        arp: ArpPayload {
            htype: HTYPE_ETHERNET,
            ptype: PTYPE_IPV4,
            hlen: HLEN_ETHERNET,
            plen: PLEN_IPV4,
            opcode: Opcode::REPLY,
            sender_mac: target.mac.clone(),
            sender_ip: target.ip.clone(),
            target_mac: requester.mac.clone(),
            target_ip: requester.ip.clone(),
        },
    }
}

// ── Describe ──────────────────────────────────────────────────────────

/// Per-layer text rendering of a frame, for the detail pane.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameDescription {
    pub link_layer: String,
    pub arp: String,
}

pub fn describe(frame: &Frame) -> FrameDescription {
    let eth = &frame.eth;
    let arp = &frame.arp;

    let link_layer = format!(
        "Ethernet II\n  Destination: {}\n  Source:      {}\n  Type:        {}",
        eth.dst_mac, eth.src_mac, eth.ethertype
    );

    let arp = format!(
        "Address Resolution Protocol ({})\n  Hardware type: {}\n  Protocol type: {:#06x}\n  Hardware size: {}\n  Protocol size: {}\n  Opcode:        {}\n  Sender MAC:    {}\n  Sender IP:     {}\n  Target MAC:    {}\n  Target IP:     {}",
        arp.opcode.name(),
        arp.htype,
        arp.ptype,
        arp.hlen,
        arp.plen,
        arp.opcode,
        arp.sender_mac,
        arp.sender_ip,
        arp.target_mac,
        arp.target_ip,
    );

    FrameDescription { link_layer, arp }
}
