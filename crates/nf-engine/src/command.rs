//! The two command kinds and the lists that hold them.
//!
//! Commands are plain data; nothing here touches a socket. The orchestrator
//! fills both lists completely before either peer starts.

use std::net::Ipv6Addr;
use std::sync::Arc;

use nf_net::Sender;
use nf_packet::parse::{EtherHeader, Ipv6Header};
use nf_packet::{Packet, PacketError};

/// A forged frame bound to a sender, with its repeat/cadence settings.
///
/// `repeat` semantics: 0 and 1 send once, n > 1 sends n times, negative
/// repeats forever. `timeout_secs` is the delay before a one-shot send and
/// the period between repeated sends; values at or below zero fire
/// immediately.
pub struct TransmitCommand {
    pub sender: Arc<Sender>,
    pub packet: Packet,
    pub timeout_secs: i64,
    pub repeat: i64,
}

/// A synthesised reply to be transmitted on the listening interface.
pub struct Action {
    pub packet: Packet,
}

/// Reacts to one inbound ICMPv6 frame, optionally producing a reply.
pub trait Responder: Send {
    fn on_frame(
        &mut self,
        eth: &EtherHeader,
        ip6: &Ipv6Header,
        payload: &[u8],
    ) -> Option<Action>;
}

/// Watch one interface and hand matching ICMPv6 frames to a responder.
pub struct ListenCommand {
    pub interface: String,
    pub src_filter: Option<Ipv6Addr>,
    pub dst_filter: Option<Ipv6Addr>,
    pub timeout_secs: i64,
    pub responder: Box<dyn Responder>,
}

/// The transmit and listen queues, populated during parsing.
#[derive(Default)]
pub struct CommandLists {
    transmits: Vec<TransmitCommand>,
    listens: Vec<ListenCommand>,
}

impl CommandLists {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transmit command; a packet violating the layer invariants is
    /// rejected and the list is left unchanged.
    pub fn push_transmit(&mut self, cmd: TransmitCommand) -> Result<(), PacketError> {
        cmd.packet.validate()?;
        self.transmits.push(cmd);
        Ok(())
    }

    pub fn push_listen(&mut self, cmd: ListenCommand) {
        self.listens.push(cmd);
    }

    pub fn transmit_count(&self) -> usize {
        self.transmits.len()
    }

    pub fn listen_count(&self) -> usize {
        self.listens.len()
    }

    pub fn into_parts(self) -> (Vec<TransmitCommand>, Vec<ListenCommand>) {
        (self.transmits, self.listens)
    }
}
