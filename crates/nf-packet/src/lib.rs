//! Wire-level building blocks: Ethernet/IPv6/ICMPv6 frame construction and
//! parsing for Neighbor Discovery (RFC 4861).

pub mod layer;
pub mod mac;
pub mod ndp;
pub mod parse;

pub use layer::{Layer, Packet, PacketError};
pub use mac::Mac;
