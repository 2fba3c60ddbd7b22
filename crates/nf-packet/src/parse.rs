//! Inbound frame parsing for the listen path.
//!
//! Parsers return `None` on anything malformed; the listener drops such
//! frames without surfacing an error.

use std::net::Ipv6Addr;

use crate::layer::{ETHER_HDR_LEN, IPV6_HDR_LEN};
use crate::mac::Mac;
use crate::ndp::{ND_OPT_PREFIX_INFORMATION, ND_OPT_SOURCE_LLADDR};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EtherHeader {
    pub dst: Mac,
    pub src: Mac,
    pub ethertype: u16,
}

impl EtherHeader {
    /// Split an Ethernet header off the front of a frame.
    pub fn parse(frame: &[u8]) -> Option<(Self, &[u8])> {
        if frame.len() < ETHER_HDR_LEN {
            return None;
        }
        let mut dst = [0u8; 6];
        let mut src = [0u8; 6];
        dst.copy_from_slice(&frame[0..6]);
        src.copy_from_slice(&frame[6..12]);
        let hdr = EtherHeader {
            dst: Mac(dst),
            src: Mac(src),
            ethertype: u16::from_be_bytes([frame[12], frame[13]]),
        };
        Some((hdr, &frame[ETHER_HDR_LEN..]))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv6Header {
    pub payload_len: u16,
    pub next_header: u8,
    pub hop_limit: u8,
    pub src: Ipv6Addr,
    pub dst: Ipv6Addr,
}

impl Ipv6Header {
    pub fn parse(data: &[u8]) -> Option<(Self, &[u8])> {
        if data.len() < IPV6_HDR_LEN || data[0] >> 4 != 6 {
            return None;
        }
        let mut src = [0u8; 16];
        let mut dst = [0u8; 16];
        src.copy_from_slice(&data[8..24]);
        dst.copy_from_slice(&data[24..40]);
        let hdr = Ipv6Header {
            payload_len: u16::from_be_bytes([data[4], data[5]]),
            next_header: data[6],
            hop_limit: data[7],
            src: Ipv6Addr::from(src),
            dst: Ipv6Addr::from(dst),
        };
        Some((hdr, &data[IPV6_HDR_LEN..]))
    }
}

/// Length of the fixed Router Advertisement message ahead of its options.
pub const RA_FIXED_LEN: usize = 16;

/// Options of interest recovered from a Router Advertisement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RaOptions {
    pub prefix: Option<(Ipv6Addr, u8)>,
    pub source_lladdr: Option<Mac>,
}

/// Walk an NDP options block, advancing by `length * 8` octets per option.
/// A zero length or an option body running past the block truncates the walk.
pub fn walk_ra_options(mut data: &[u8]) -> RaOptions {
    let mut found = RaOptions::default();
    while data.len() >= 2 {
        let opt_type = data[0];
        let opt_len = data[1] as usize * 8;
        if opt_len == 0 || opt_len > data.len() {
            break;
        }
        match (opt_type, opt_len) {
            (ND_OPT_PREFIX_INFORMATION, 32) => {
                let mut prefix = [0u8; 16];
                prefix.copy_from_slice(&data[16..32]);
                found.prefix = Some((Ipv6Addr::from(prefix), data[2]));
            }
            (ND_OPT_SOURCE_LLADDR, 8) => {
                let mut mac = [0u8; 6];
                mac.copy_from_slice(&data[2..8]);
                found.source_lladdr = Some(Mac(mac));
            }
            _ => {}
        }
        data = &data[opt_len..];
    }
    found
}
