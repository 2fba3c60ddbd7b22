//! Neighbor Discovery frame construction (RFC 4861).

use std::net::Ipv6Addr;

use crate::layer::{ICMP6_HDR_LEN, Layer, Packet};
use crate::mac::Mac;

pub const ETH_P_IPV6: u16 = 0x86dd;
pub const IPPROTO_ICMPV6: u8 = 58;

pub const ND_ROUTER_ADVERT: u8 = 134;
pub const ND_NEIGHBOR_ADVERT: u8 = 136;

pub const ND_OPT_SOURCE_LLADDR: u8 = 1;
pub const ND_OPT_TARGET_LLADDR: u8 = 2;
pub const ND_OPT_PREFIX_INFORMATION: u8 = 3;

/// All-nodes link-local multicast (ff02::1).
pub const ALL_NODES_IP: Ipv6Addr = Ipv6Addr::new(0xff02, 0, 0, 0, 0, 0, 0, 1);
/// Ethernet mapping of ff02::1.
pub const ALL_NODES_MAC: Mac = Mac([0x33, 0x33, 0x00, 0x00, 0x00, 0x01]);

fn ethernet_header(src: Mac, dst: Mac) -> Vec<u8> {
    let mut hdr = Vec::with_capacity(14);
    hdr.extend_from_slice(&dst.octets());
    hdr.extend_from_slice(&src.octets());
    hdr.extend_from_slice(&ETH_P_IPV6.to_be_bytes());
    hdr
}

fn ipv6_header(src: Ipv6Addr, dst: Ipv6Addr, payload_len: u16) -> Vec<u8> {
    let mut hdr = Vec::with_capacity(40);
    hdr.extend_from_slice(&[0x60, 0, 0, 0]);
    hdr.extend_from_slice(&payload_len.to_be_bytes());
    hdr.push(IPPROTO_ICMPV6);
    hdr.push(255); // NDP requires hop limit 255
    hdr.extend_from_slice(&src.octets());
    hdr.extend_from_slice(&dst.octets());
    hdr
}

/// Assemble the common Ethernet/IPv6/ICMPv6 shell around an NDP body.
/// The checksum field of `icmp` must be zero; serialization fills it in.
fn nd_packet(
    src_eth: Mac,
    dst_eth: Mac,
    src_ip: Ipv6Addr,
    dst_ip: Ipv6Addr,
    icmp: [u8; ICMP6_HDR_LEN],
    body: Vec<u8>,
) -> Packet {
    let mut pkt = Packet::new();
    pkt.push(Layer::Ethernet, ethernet_header(src_eth, dst_eth));
    pkt.push(
        Layer::Ipv6,
        ipv6_header(src_ip, dst_ip, (ICMP6_HDR_LEN + body.len()) as u16),
    );
    pkt.push(Layer::Icmpv6, icmp.to_vec());
    pkt.push(Layer::Data, body);
    pkt
}

/// Forge a Neighbor Advertisement announcing `target_ip` at `target_eth`.
///
/// The Solicited flag is set; Router and Override are clear.
pub fn neighbor_advert(
    src_eth: Mac,
    dst_eth: Mac,
    src_ip: Ipv6Addr,
    dst_ip: Ipv6Addr,
    target_ip: Ipv6Addr,
    target_eth: Mac,
) -> Packet {
    let mut body = Vec::with_capacity(16 + 2 + 6);
    body.extend_from_slice(&target_ip.octets());
    body.extend_from_slice(&[ND_OPT_TARGET_LLADDR, 1]);
    body.extend_from_slice(&target_eth.octets());

    let mut icmp = [0u8; ICMP6_HDR_LEN];
    icmp[0] = ND_NEIGHBOR_ADVERT;
    icmp[4] = 0x20;

    nd_packet(src_eth, dst_eth, src_ip, dst_ip, icmp, body)
}

/// Forge a Router Advertisement carrying a Prefix Information option for
/// `prefix`/`prefix_len` and a Source Link-layer Address option.
///
/// `lifetime` goes into the router-lifetime field (octets 6-7 of the RA
/// message); zero evicts the advertised router from victims' default router
/// lists.
pub fn router_advert(
    src_eth: Mac,
    dst_eth: Mac,
    src_ip: Ipv6Addr,
    dst_ip: Ipv6Addr,
    prefix: Ipv6Addr,
    prefix_len: u8,
    lifetime: u16,
    target_eth: Mac,
) -> Packet {
    let mut icmp = [0u8; ICMP6_HDR_LEN];
    icmp[0] = ND_ROUTER_ADVERT;
    icmp[6..8].copy_from_slice(&lifetime.to_be_bytes());

    let mut body = Vec::with_capacity(8 + 32 + 8);
    // Reachable time + retrans timer: unspecified
    body.extend_from_slice(&[0u8; 8]);
    // Prefix Information option, 32 bytes
    body.extend_from_slice(&[ND_OPT_PREFIX_INFORMATION, 4, prefix_len]);
    body.extend_from_slice(&[0u8; 13]);
    body.extend_from_slice(&prefix.octets());
    // Source Link-layer Address option, 8 bytes
    body.extend_from_slice(&[ND_OPT_SOURCE_LLADDR, 1]);
    body.extend_from_slice(&target_eth.octets());

    nd_packet(src_eth, dst_eth, src_ip, dst_ip, icmp, body)
}
