//! Raw-socket listen loop: parse, filter, hand off to the responder, and
//! transmit whatever it synthesises.

use std::os::fd::{AsRawFd, RawFd};
use std::sync::Arc;

use nf_common::ForgeError;
use nf_net::{Sender, SenderRegistry};
use nf_packet::ndp::{ETH_P_IPV6, IPPROTO_ICMPV6};
use nf_packet::parse::{EtherHeader, Ipv6Header};
use tokio::io::Interest;
use tokio::io::unix::AsyncFd;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::command::{Action, ListenCommand};

/// Decide what one inbound frame means for a listen command.
///
/// Anything that is not well-formed IPv6-over-Ethernet carrying ICMPv6, or
/// that fails the command's address filters, is dropped without a trace.
pub fn process_frame(cmd: &mut ListenCommand, frame: &[u8]) -> Option<Action> {
    let (eth, rest) = EtherHeader::parse(frame)?;
    if eth.ethertype != ETH_P_IPV6 {
        return None;
    }
    let (ip6, payload) = Ipv6Header::parse(rest)?;
    if ip6.next_header != IPPROTO_ICMPV6 {
        return None;
    }
    // Trailing link padding is not part of the ICMPv6 message
    let payload = payload.get(..ip6.payload_len as usize)?;

    if cmd.src_filter.is_some_and(|src| src != ip6.src) {
        return None;
    }
    if cmd.dst_filter.is_some_and(|dst| dst != ip6.dst) {
        return None;
    }
    cmd.responder.on_frame(&eth, &ip6, payload)
}

/// Newtype so a borrowed raw fd can drive an [`AsyncFd`]; the fd is owned by
/// the sender held alive by the listen loop.
struct ListenFd(RawFd);

impl AsRawFd for ListenFd {
    fn as_raw_fd(&self) -> RawFd {
        self.0
    }
}

/// Read frames on one interface until the task is cancelled.
async fn listen(mut cmd: ListenCommand, sender: Arc<Sender>) -> Result<(), ForgeError> {
    sender.set_nonblocking(true)?;
    let fd = sender.raw_fd().ok_or(ForgeError::NoDevice)?;
    let afd = AsyncFd::with_interest(ListenFd(fd), Interest::READABLE)
        .map_err(ForgeError::from)?;

    info!(interface = %cmd.interface, "listening for router advertisements");

    let mut buf = vec![0u8; 65536];
    loop {
        let mut guard = afd.readable().await.map_err(ForgeError::from)?;
        let len = match guard.try_io(|_| sender.recv(&mut buf)) {
            Ok(Ok(len)) => len,
            Ok(Err(err)) => return Err(err.into()),
            Err(_would_block) => continue,
        };

        if let Some(action) = process_frame(&mut cmd, &buf[..len]) {
            match action.packet.to_wire() {
                Ok(frame) => {
                    if let Err(err) = sender.transmit(&frame) {
                        warn!(sender = %sender, error = %err, "failed to send reply");
                    } else {
                        debug!(sender = %sender, len = frame.len(), "sent synthesised reply");
                    }
                }
                Err(err) => warn!(error = %err, "refusing to serialize reply"),
            }
        }
    }
}

/// Run every listen command, each on its own task, until one fails or the
/// whole set is cancelled from outside.
pub async fn run(
    listens: Vec<ListenCommand>,
    registry: &mut SenderRegistry,
) -> Result<(), ForgeError> {
    let mut tasks = JoinSet::new();
    for cmd in listens {
        let sender = registry.get_or_open(&cmd.interface)?;
        tasks.spawn(listen(cmd, sender));
    }
    while let Some(res) = tasks.join_next().await {
        match res {
            Ok(Ok(())) => {}
            Ok(Err(err)) => return Err(err),
            Err(_join) => return Err(ForgeError::Fatal),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Responder;
    use nf_packet::Mac;
    use nf_packet::ndp::{ALL_NODES_IP, ALL_NODES_MAC, neighbor_advert};

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingResponder {
        seen: Arc<AtomicUsize>,
    }

    impl Responder for CountingResponder {
        fn on_frame(
            &mut self,
            _eth: &EtherHeader,
            _ip6: &Ipv6Header,
            _payload: &[u8],
        ) -> Option<Action> {
            self.seen.fetch_add(1, Ordering::SeqCst);
            None
        }
    }

    fn listen_cmd(
        src_filter: Option<&str>,
        dst_filter: Option<&str>,
    ) -> (ListenCommand, Arc<AtomicUsize>) {
        let seen = Arc::new(AtomicUsize::new(0));
        let cmd = ListenCommand {
            interface: "veth0".to_string(),
            src_filter: src_filter.map(|s| s.parse().unwrap()),
            dst_filter: dst_filter.map(|s| s.parse().unwrap()),
            timeout_secs: 0,
            responder: Box::new(CountingResponder { seen: seen.clone() }),
        };
        (cmd, seen)
    }

    fn sample_frame() -> Vec<u8> {
        neighbor_advert(
            Mac([1; 6]),
            ALL_NODES_MAC,
            "fe80::aa".parse().unwrap(),
            ALL_NODES_IP,
            "fe80::1".parse().unwrap(),
            Mac([1; 6]),
        )
        .to_wire()
        .unwrap()
    }

    #[test]
    fn test_icmpv6_frame_reaches_responder() {
        let (mut cmd, seen) = listen_cmd(None, None);
        assert!(process_frame(&mut cmd, &sample_frame()).is_none());
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_non_ipv6_ethertype_discarded() {
        let (mut cmd, seen) = listen_cmd(None, None);
        let mut frame = sample_frame();
        frame[12] = 0x08;
        frame[13] = 0x00;
        process_frame(&mut cmd, &frame);
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_non_icmpv6_next_header_discarded() {
        let (mut cmd, seen) = listen_cmd(None, None);
        let mut frame = sample_frame();
        frame[20] = 17; // UDP
        process_frame(&mut cmd, &frame);
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_source_filter_applies() {
        let (mut cmd, seen) = listen_cmd(Some("fe80::aa"), None);
        process_frame(&mut cmd, &sample_frame());
        assert_eq!(seen.load(Ordering::SeqCst), 1);

        let (mut cmd, seen) = listen_cmd(Some("fe80::bb"), None);
        process_frame(&mut cmd, &sample_frame());
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_destination_filter_applies() {
        let (mut cmd, seen) = listen_cmd(None, Some("ff02::1"));
        process_frame(&mut cmd, &sample_frame());
        assert_eq!(seen.load(Ordering::SeqCst), 1);

        let (mut cmd, seen) = listen_cmd(None, Some("fe80::1"));
        process_frame(&mut cmd, &sample_frame());
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_truncated_frame_discarded() {
        let (mut cmd, seen) = listen_cmd(None, None);
        let frame = sample_frame();
        // Cut into the ICMPv6 payload so it is shorter than the IPv6
        // payload length claims
        process_frame(&mut cmd, &frame[..frame.len() - 4]);
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }
}
