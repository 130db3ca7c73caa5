use std::time::Duration;

use core::dev::Interface;
use core::link::{
    Frames,
    Link,
};
use core::repr::{
    decode,
    eth_types,
    Arp,
    ArpOp,
    EthernetAddress,
    Ipv4Address,
    Layer,
};
use core::service::ethernet;
use {
    Error,
    Result,
};

/// Builds an Ethernet frame carrying an ARP packet.
pub fn build_packet(
    interface: &Interface,
    arp_repr: &Arp,
    dst_addr: EthernetAddress,
) -> Result<Vec<u8>> {
    ethernet::build_frame(
        interface,
        dst_addr,
        eth_types::ARP,
        arp_repr.buffer_len(),
        |arp_buffer| arp_repr.serialize(arp_buffer),
    )
}

/// Sends an ARP packet via a link.
pub fn send_packet<L>(
    link: &mut L,
    interface: &Interface,
    arp_repr: &Arp,
    dst_addr: EthernetAddress,
) -> Result<()>
where
    L: Link + ?Sized,
{
    let eth_buffer = build_packet(interface, arp_repr, dst_addr)?;
    ethernet::send_frame(link, &eth_buffer)
}

/// Resolves the Ethernet address for an IPv4 address.
///
/// A single ARP request is broadcast via the link, after which frames are read
/// until an ARP reply from ipv4_addr arrives. Any other frame is skipped. Fails
/// with `Error::ResolutionTimeout` if no reply arrives within timeout.
pub fn resolve<L>(
    link: &mut L,
    interface: &Interface,
    ipv4_addr: Ipv4Address,
    timeout: Duration,
) -> Result<EthernetAddress>
where
    L: Link + ?Sized,
{
    let arp_request = Arp::request(interface.ethernet_addr, interface.ipv4_addr, ipv4_addr);

    debug!("Sending ARP request for {}.", ipv4_addr);
    send_packet(link, interface, &arp_request, EthernetAddress::BROADCAST)?;

    for eth_buffer in Frames::new(link, timeout) {
        let eth_buffer = eth_buffer?;

        match decode(&eth_buffer) {
            Ok(Layer::Arp(arp_repr))
                if arp_repr.op == ArpOp::Reply && arp_repr.source_proto_addr == ipv4_addr =>
            {
                debug!(
                    "Received ARP reply, {} is at {}.",
                    ipv4_addr, arp_repr.source_hw_addr
                );
                return Ok(arp_repr.source_hw_addr);
            }
            Ok(layer) => debug!("Ignoring {:?} while resolving {}.", layer, ipv4_addr),
            Err(err) => debug!(
                "Ignoring frame with {:?} while resolving {}.",
                err, ipv4_addr
            ),
        }
    }

    warn!("No ARP reply from {} within {:?}.", ipv4_addr, timeout);
    Err(Error::ResolutionTimeout(ipv4_addr))
}
