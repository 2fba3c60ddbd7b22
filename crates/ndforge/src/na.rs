//! The `na` front-end: forge one Neighbor Advertisement per invocation.

use anyhow::Result;
use nf_engine::{CommandLists, TransmitCommand};
use nf_net::SenderRegistry;
use nf_packet::ndp;
use tracing::debug;

use crate::cli::NaOpts;
use crate::cmds::{check_cadence, open_sender};

pub fn append(
    opts: &NaOpts,
    registry: &mut SenderRegistry,
    lists: &mut CommandLists,
) -> Result<()> {
    check_cadence(opts.repeat, opts.timeout)?;
    let sender = open_sender(registry, &opts.interface)?;

    let src_mac = opts.src_mac.unwrap_or_else(|| sender.hwaddr());
    let target_mac = opts.target_mac.unwrap_or(src_mac);
    let target_ip = opts.target_ip.unwrap_or(opts.src_ip);
    if opts.prefix.is_some() {
        debug!("a neighbor advertisement carries no prefix, ignoring --prefix");
    }

    let packet = ndp::neighbor_advert(
        src_mac,
        opts.dst_mac,
        opts.src_ip,
        opts.dst_ip,
        target_ip,
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
