use std::ffi::CString;
use std::io;
use std::mem;
use std::time::Duration;

use libc;

use core::link::Link;
use linux::libc as _libc;
use {
    Error,
    Result,
};

/// [Packet socket](http://man7.org/linux/man-pages/man7/packet.7.html) for
/// sending and receiving raw Ethernet frames on an interface.
///
/// Frames sent by the host itself are filtered out when receiving.
#[derive(Debug)]
pub struct PacketSocket {
    fd: libc::c_int,
}

impl PacketSocket {
    /// Opens a packet socket bound to the interface with the specified name.
    ///
    /// Requires CAP_NET_RAW.
    pub fn open(ifr_name: &str) -> Result<PacketSocket> {
        let c_ifr_name =
            CString::new(ifr_name).map_err(|_| Error::InterfaceLookup(ifr_name.to_string()))?;

        let ifindex = unsafe { libc::if_nametoindex(c_ifr_name.as_ptr()) };
        if ifindex == 0 {
            return Err(Error::InterfaceLookup(ifr_name.to_string()));
        }

        let protocol = _libc::ETH_P_ALL.to_be();

        let fd = unsafe { libc::socket(libc::AF_PACKET, libc::SOCK_RAW, protocol as libc::c_int) };
        if fd == -1 {
            return Err(Error::IO(io::Error::last_os_error()));
        }

        let mut addr: libc::sockaddr_ll = unsafe { mem::zeroed() };
        addr.sll_family = libc::AF_PACKET as libc::c_ushort;
        addr.sll_protocol = protocol;
        addr.sll_ifindex = ifindex as libc::c_int;

        let bound = unsafe {
            libc::bind(
                fd,
                &addr as *const libc::sockaddr_ll as *const libc::sockaddr,
                mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t,
            )
        };

        if bound == -1 {
            let err = io::Error::last_os_error();
            unsafe {
                libc::close(fd);
            }
            return Err(Error::IO(err));
        }

        debug!("Opened packet socket on {} (index {}).", ifr_name, ifindex);
        Ok(PacketSocket { fd })
    }

    /// Waits up to timeout for the socket to become readable.
    fn poll(&self, timeout: Duration) -> io::Result<bool> {
        let timeout_ms = timeout.as_secs() * 1000 + u64::from(timeout.subsec_nanos() / 1_000_000);
        let timeout_ms = if timeout_ms == 0 && timeout > Duration::from_secs(0) {
            1
        } else {
            timeout_ms.min(libc::c_int::max_value() as u64)
        };

        let mut pollfd = libc::pollfd {
            fd: self.fd,
            events: libc::POLLIN,
            revents: 0,
        };

        match unsafe { libc::poll(&mut pollfd, 1, timeout_ms as libc::c_int) } {
            -1 if _libc::errno() == libc::EINTR => Ok(false),
            -1 => Err(io::Error::last_os_error()),
            0 => Ok(false),
            _ => Ok(true),
        }
    }
}

impl Link for PacketSocket {
    fn send(&mut self, buffer: &[u8]) -> io::Result<()> {
        let wrote = unsafe {
            libc::send(
                self.fd,
                buffer.as_ptr() as *const libc::c_void,
                buffer.len(),
                0,
            )
        };

        if wrote < 0 {
            Err(io::Error::last_os_error())
        } else if wrote as usize != buffer.len() {
            Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "frame partially written",
            ))
        } else {
            Ok(())
        }
    }

    fn recv(&mut self, buffer: &mut [u8], timeout: Duration) -> io::Result<Option<usize>> {
        if !self.poll(timeout)? {
            return Ok(None);
        }

        let mut addr: libc::sockaddr_ll = unsafe { mem::zeroed() };
        let mut addr_len = mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t;

        let read = unsafe {
            libc::recvfrom(
                self.fd,
                buffer.as_mut_ptr() as *mut libc::c_void,
                buffer.len(),
                libc::MSG_TRUNC,
                &mut addr as *mut libc::sockaddr_ll as *mut libc::sockaddr,
                &mut addr_len,
            )
        };

        if read < 0 && (_libc::errno() == libc::EAGAIN || _libc::errno() == libc::EINTR) {
            Ok(None)
        } else if read < 0 {
            Err(io::Error::last_os_error())
        } else if addr.sll_pkttype == _libc::PACKET_OUTGOING {
            Ok(None)
        } else {
            // MSG_TRUNC reports the full frame length even if it was truncated.
            Ok(Some((read as usize).min(buffer.len())))
        }
    }
}

impl Drop for PacketSocket {
    fn drop(&mut self) {
        debug!("Closing packet socket {}.", self.fd);
        unsafe {
            libc::close(self.fd);
        }
    }
}
