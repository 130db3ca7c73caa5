use core::link::Link;
use core::repr::{
    EthernetAddress,
    Ipv4Address,
};
use Result;

/// The addresses bound to a named network interface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interface {
    /// Name of the interface, i.e. eth0.
    pub name: String,
    /// Hardware address of the interface.
    pub ethernet_addr: EthernetAddress,
    /// First IPv4 address assigned to the interface.
    pub ipv4_addr: Ipv4Address,
}

/// Access to the network interfaces of a machine.
///
/// A host is the seam between the protocol logic and the platform: it looks
/// up interface addresses and opens links that send and receive raw Ethernet
/// frames on an interface.
pub trait Host {
    type Link: Link;

    /// Returns the hardware and IPv4 address of an interface.
    ///
    /// Fails with `Error::InterfaceLookup` if no interface has the name or the
    /// interface has no IPv4 address.
    fn lookup(&self, ifr_name: &str) -> Result<Interface>;

    /// Opens a link on an interface. The link is released when dropped.
    fn open(&self, ifr_name: &str) -> Result<Self::Link>;
}

impl<'a, H: Host + ?Sized> Host for &'a H {
    type Link = H::Link;

    fn lookup(&self, ifr_name: &str) -> Result<Interface> {
        (**self).lookup(ifr_name)
    }

    fn open(&self, ifr_name: &str) -> Result<Self::Link> {
        (**self).open(ifr_name)
    }
}
