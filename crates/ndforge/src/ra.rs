//! The `ra` front-end: forge one Router Advertisement per invocation.

use anyhow::{Result, bail};
use nf_engine::{CommandLists, TransmitCommand};
use nf_net::SenderRegistry;
use nf_packet::ndp::{self, ALL_NODES_IP, ALL_NODES_MAC};

use crate::cli::RaOpts;
use crate::cmds::{check_cadence, open_sender};

pub fn append(
    opts: &RaOpts,
    registry: &mut SenderRegistry,
    lists: &mut CommandLists,
) -> Result<()> {
    check_cadence(opts.repeat, opts.timeout)?;

    let (dst_mac, dst_ip) = match (opts.dst_mac, opts.dst_ip) {
        (None, None) => (ALL_NODES_MAC, ALL_NODES_IP),
        (Some(mac), Some(ip)) => (mac, ip),
        _ => bail!("Must provide a destination mac and ip address, or none at all."),
    };
    let src_ip = opts.src_ip.unwrap_or(opts.router_ip);

    let sender = open_sender(registry, &opts.interface)?;
    let src_mac = opts.src_mac.unwrap_or_else(|| sender.hwaddr());
    let target_mac = opts.target_mac.unwrap_or(src_mac);

    let packet = ndp::router_advert(
        src_mac,
        dst_mac,
        src_ip,
        dst_ip,
        opts.router_ip,
        opts.prefix,
        opts.lifetime,
        target_mac,
    );

    lists.push_transmit(TransmitCommand {
        sender,
        packet,
        timeout_secs: opts.timeout,
        repeat: opts.repeat,
    })?;
    Ok(())
}
