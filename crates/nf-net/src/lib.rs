//! Raw link-layer sockets and the per-interface sender registry.

pub mod linux;
pub mod registry;
pub mod sender;

pub use linux::{LinkInfo, PacketSocket};
pub use registry::SenderRegistry;
pub use sender::{FrameLink, Sender};
