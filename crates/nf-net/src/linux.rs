//! AF_PACKET socket creation and interface discovery (Linux).

use std::io;
use std::mem;
use std::os::fd::{AsRawFd, RawFd};

use socket2::{Domain, Protocol, Socket, Type};

/// Link-layer facts discovered from the OS when a socket is opened.
#[derive(Debug, Clone, Copy)]
pub struct LinkInfo {
    pub hwaddr: [u8; 6],
    pub mtu: usize,
    pub index: u32,
}

/// A raw packet socket bound to one interface, carrying the sockaddr_ll
/// needed to address outbound frames.
pub struct PacketSocket {
    socket: Socket,
    addr: libc::sockaddr_ll,
}

impl PacketSocket {
    /// Open a raw link-layer socket on `iface` and query its hardware
    /// address, MTU, and interface index.
    pub fn open(iface: &str) -> io::Result<(Self, LinkInfo)> {
        let mut ifr = ifreq_for(iface)?;

        let proto = (libc::ETH_P_ALL as u16).to_be();
        let socket = Socket::new(
            Domain::PACKET,
            Type::RAW,
            Some(Protocol::from(i32::from(proto))),
        )?;
        let fd = socket.as_raw_fd();

        ioctl(fd, libc::SIOCGIFHWADDR, &mut ifr)?;
        let sa_data = unsafe { ifr.ifr_ifru.ifru_hwaddr.sa_data };
        let mut hwaddr = [0u8; 6];
        for (dst, src) in hwaddr.iter_mut().zip(sa_data.iter()) {
            *dst = *src as u8;
        }

        ioctl(fd, libc::SIOCGIFMTU, &mut ifr)?;
        let mtu = unsafe { ifr.ifr_ifru.ifru_mtu } as usize;

        ioctl(fd, libc::SIOCGIFINDEX, &mut ifr)?;
        let index = unsafe { ifr.ifr_ifru.ifru_ifindex };

        let mut addr: libc::sockaddr_ll = unsafe { mem::zeroed() };
        addr.sll_family = libc::AF_PACKET as u16;
        addr.sll_ifindex = index;
        addr.sll_halen = 6;
        addr.sll_addr[..6].copy_from_slice(&hwaddr);

        let info = LinkInfo {
            hwaddr,
            mtu,
            index: index as u32,
        };
        Ok((Self { socket, addr }, info))
    }

    /// Emit one frame as a single datagram on the bound interface.
    pub fn send(&self, frame: &[u8]) -> io::Result<usize> {
        let res = unsafe {
            libc::sendto(
                self.socket.as_raw_fd(),
                frame.as_ptr() as *const libc::c_void,
                frame.len(),
                0,
                &self.addr as *const libc::sockaddr_ll as *const libc::sockaddr,
                mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t,
            )
        };
        if res < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(res as usize)
        }
    }

    pub fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        let res = unsafe {
            libc::recv(
                self.socket.as_raw_fd(),
                buf.as_mut_ptr() as *mut libc::c_void,
                buf.len(),
                0,
            )
        };
        if res < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(res as usize)
        }
    }

    pub fn set_nonblocking(&self, nonblocking: bool) -> io::Result<()> {
        self.socket.set_nonblocking(nonblocking)
    }
}

impl AsRawFd for PacketSocket {
    fn as_raw_fd(&self) -> RawFd {
        self.socket.as_raw_fd()
    }
}

fn ifreq_for(iface: &str) -> io::Result<libc::ifreq> {
    let mut ifr: libc::ifreq = unsafe { mem::zeroed() };
    let name = iface.as_bytes();
    // Room for the trailing NUL
    if name.is_empty() || name.len() >= ifr.ifr_name.len() {
        return Err(io::Error::from_raw_os_error(libc::ENODEV));
    }
    for (dst, src) in ifr.ifr_name.iter_mut().zip(name.iter()) {
        *dst = *src as libc::c_char;
    }
    Ok(ifr)
}

fn ioctl(fd: RawFd, request: libc::Ioctl, ifr: &mut libc::ifreq) -> io::Result<()> {
    let res = unsafe { libc::ioctl(fd, request, ifr as *mut libc::ifreq) };
    if res < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ifreq_name_bounds() {
        assert!(ifreq_for("eth0").is_ok());
        assert!(ifreq_for("").is_err());
        // IFNAMSIZ is 16 including the NUL
        assert!(ifreq_for("a-very-long-interface-name").is_err());
    }
}
