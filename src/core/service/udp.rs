use core::dev::Interface;
use core::link::Link;
use core::repr::{
    EthernetAddress,
    Ipv4Protocol,
    Ipv4Repr,
    UdpPacket,
    UdpRepr,
};
use core::service::{
    ethernet,
    ipv4,
};
use core::socket::SocketAddr;
use {
    Error,
    Result,
};

/// Builds an Ethernet frame carrying a UDP datagram from src_port on the
/// interface to dst_socket_addr.
pub fn build_packet(
    interface: &Interface,
    dst_hw_addr: EthernetAddress,
    src_port: u16,
    dst_socket_addr: &SocketAddr,
    payload: &[u8],
    ttl: u8,
) -> Result<Vec<u8>> {
    let udp_repr = UdpRepr::new(src_port, dst_socket_addr.port, payload.len())
        .map_err(|_| Error::Serialization)?;
    let ipv4_repr = Ipv4Repr {
        src_addr: interface.ipv4_addr,
        dst_addr: dst_socket_addr.addr,
        protocol: Ipv4Protocol::UDP,
        payload_len: ipv4::payload_len(udp_repr.buffer_len())?,
    };

    ipv4::build_packet(interface, dst_hw_addr, &ipv4_repr, ttl, |udp_buffer| {
        let mut udp_packet = UdpPacket::try_new(udp_buffer)?;
        udp_packet.payload_mut().copy_from_slice(payload);
        // Payload first, the checksum covers it.
        udp_repr.serialize(&mut udp_packet, &ipv4_repr);
        Ok(())
    })
}

/// Sends a UDP datagram via a link.
pub fn send_packet<L>(
    link: &mut L,
    interface: &Interface,
    dst_hw_addr: EthernetAddress,
    src_port: u16,
    dst_socket_addr: &SocketAddr,
    payload: &[u8],
    ttl: u8,
) -> Result<()>
where
    L: Link + ?Sized,
{
    let eth_buffer = build_packet(
        interface,
        dst_hw_addr,
        src_port,
        dst_socket_addr,
        payload,
        ttl,
    )?;

    debug!(
        "Sending {} byte UDP payload from port {} to {}.",
        payload.len(),
        src_port,
        dst_socket_addr
    );
    ethernet::send_frame(link, &eth_buffer)
}
