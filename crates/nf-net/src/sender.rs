use std::fmt;
use std::io;
use std::os::fd::{AsRawFd, RawFd};

use nf_common::ForgeError;
use nf_packet::Mac;

use crate::linux::PacketSocket;

/// The seam between a sender and the wire. The production implementation is
/// [`PacketSocket`]; tests substitute in-memory links.
pub trait FrameLink: Send + Sync {
    fn send_frame(&self, frame: &[u8]) -> io::Result<usize>;

    fn recv_frame(&self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::from(io::ErrorKind::Unsupported))
    }

    fn set_nonblocking(&self, _nonblocking: bool) -> io::Result<()> {
        Ok(())
    }

    fn raw_fd(&self) -> Option<RawFd> {
        None
    }
}

impl FrameLink for PacketSocket {
    fn send_frame(&self, frame: &[u8]) -> io::Result<usize> {
        self.send(frame)
    }

    fn recv_frame(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.recv(buf)
    }

    fn set_nonblocking(&self, nonblocking: bool) -> io::Result<()> {
        PacketSocket::set_nonblocking(self, nonblocking)
    }

    fn raw_fd(&self) -> Option<RawFd> {
        Some(self.as_raw_fd())
    }
}

/// One open link-layer socket plus the interface facts needed to address
/// and size outbound frames.
pub struct Sender {
    link: Box<dyn FrameLink>,
    mtu: usize,
    hwaddr: Mac,
    index: u32,
    name: String,
}

impl fmt::Debug for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sender")
            .field("mtu", &self.mtu)
            .field("hwaddr", &self.hwaddr)
            .field("index", &self.index)
            .field("name", &self.name)
            .finish()
    }
}

impl Sender {
    /// Open a raw socket on the named interface.
    pub fn open(name: &str) -> Result<Self, ForgeError> {
        let (socket, info) = PacketSocket::open(name)?;
        Ok(Self {
            link: Box::new(socket),
            mtu: info.mtu,
            hwaddr: Mac(info.hwaddr),
            index: info.index,
            name: name.to_string(),
        })
    }

    /// Build a sender over an arbitrary link. Used by the registry tests and
    /// the engine's scheduling tests.
    pub fn with_link(
        link: Box<dyn FrameLink>,
        mtu: usize,
        hwaddr: Mac,
        index: u32,
        name: &str,
    ) -> Self {
        Self {
            link,
            mtu,
            hwaddr,
            index,
            name: name.to_string(),
        }
    }

    /// Send one frame. Frames larger than the interface MTU are refused
    /// before any OS call is made.
    pub fn transmit(&self, frame: &[u8]) -> Result<usize, ForgeError> {
        if frame.len() > self.mtu {
            return Err(ForgeError::TooLarge);
        }
        self.link.send_frame(frame).map_err(Into::into)
    }

    pub fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.link.recv_frame(buf)
    }

    pub fn set_nonblocking(&self, nonblocking: bool) -> io::Result<()> {
        self.link.set_nonblocking(nonblocking)
    }

    pub fn raw_fd(&self) -> Option<RawFd> {
        self.link.raw_fd()
    }

    pub fn mtu(&self) -> usize {
        self.mtu
    }

    pub fn hwaddr(&self) -> Mac {
        self.hwaddr
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (index {}, mtu {}, addr {})",
            self.name, self.index, self.mtu, self.hwaddr
        )
    }
}
