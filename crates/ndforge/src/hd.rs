//! The `hd` front-end: install a default-route hijack listener.

use anyhow::Result;
use nf_engine::{CommandLists, HijackResponder, ListenCommand};
use nf_packet::ndp::ALL_NODES_IP;

use crate::cli::HdOpts;

pub fn append(opts: &HdOpts, lists: &mut CommandLists) -> Result<()> {
    // Routers advertise to the all-nodes multicast group; anything else on
    // the wire is not worth waking the responder for.
    lists.push_listen(ListenCommand {
        interface: opts.interface.clone(),
        src_filter: None,
        dst_filter: Some(ALL_NODES_IP),
        timeout_secs: opts.timeout,
        responder: Box::new(HijackResponder::new()),
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_appended() {
        let mut lists = CommandLists::new();
        let opts = HdOpts {
            interface: "eth0".to_string(),
            timeout: 5,
        };
        append(&opts, &mut lists).unwrap();
        assert_eq!(lists.listen_count(), 1);
        assert_eq!(lists.transmit_count(), 0);
    }
}
