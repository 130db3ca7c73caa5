use std::io;
use std::net::IpAddr;

use get_if_addrs;
use libc;

use core::dev::{
    Host,
    Interface,
};
use core::repr::{
    EthernetAddress,
    Ipv4Address,
};
use linux::libc as _libc;
use linux::link::PacketSocket;
use {
    Error,
    Result,
};

/// The local machine, with packet sockets as links.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinuxHost;

impl LinuxHost {
    pub fn new() -> LinuxHost {
        LinuxHost
    }

    fn ipv4_addr(ifr_name: &str) -> Result<Ipv4Address> {
        get_if_addrs::get_if_addrs()?
            .into_iter()
            .filter(|interface| interface.name == ifr_name)
            .filter_map(|interface| match interface.ip() {
                IpAddr::V4(addr) => Some(Ipv4Address::from(addr)),
                IpAddr::V6(_) => None,
            })
            .next()
            .ok_or_else(|| Error::InterfaceLookup(ifr_name.to_string()))
    }

    fn ethernet_addr(ifr_name: &str) -> Result<EthernetAddress> {
        let mut ifreq = _libc::c_ifreq::with_name(ifr_name)
            .ok_or_else(|| Error::InterfaceLookup(ifr_name.to_string()))?;

        Self::inet_ioctl(_libc::SIOCGIFHWADDR, &mut ifreq).map_err(|err| {
            debug!("SIOCGIFHWADDR on {} failed with {}.", ifr_name, err);
            Error::InterfaceLookup(ifr_name.to_string())
        })?;

        let c_addr = &ifreq.ifr_hwaddr;
        if c_addr.sa_family != _libc::ARPHRD_ETHER {
            return Err(Error::InterfaceLookup(ifr_name.to_string()));
        }

        let mut buffer = [0; 6];
        for (i, byte) in buffer.iter_mut().enumerate() {
            *byte = c_addr.sa_data[i] as u8;
        }

        Ok(EthernetAddress::new(buffer))
    }

    fn inet_ioctl(request: libc::c_ulong, ifreq: &mut _libc::c_ifreq) -> io::Result<()> {
        unsafe {
            let fd = libc::socket(libc::AF_INET, libc::SOCK_DGRAM, 0);

            if fd == -1 {
                return Err(io::Error::last_os_error());
            }

            if libc::ioctl(fd, request as _, ifreq as *mut _libc::c_ifreq) == -1 {
                let err = io::Error::last_os_error();
                libc::close(fd);
                return Err(err);
            }

            libc::close(fd);
            Ok(())
        }
    }
}

impl Host for LinuxHost {
    type Link = PacketSocket;

    fn lookup(&self, ifr_name: &str) -> Result<Interface> {
        let ipv4_addr = Self::ipv4_addr(ifr_name)?;
        let ethernet_addr = Self::ethernet_addr(ifr_name)?;

        Ok(Interface {
            name: ifr_name.to_string(),
            ethernet_addr,
            ipv4_addr,
        })
    }

    fn open(&self, ifr_name: &str) -> Result<PacketSocket> {
        PacketSocket::open(ifr_name)
    }
}
