use std::time::Duration;

use core::dev::Interface;
use core::link::{
    Frames,
    Link,
};
use core::repr::{
    decode,
    EthernetAddress,
    Ipv4Address,
    Ipv4Protocol,
    Ipv4Repr,
    Layer,
    TcpPacket,
    TcpRepr,
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

/// Builds an Ethernet frame carrying a TCP segment from the interface to
/// dst_addr.
///
/// This function takes care of serializing a header, calculating a checksum,
/// etc. so the caller provides only the header fields and the payload.
pub fn build_packet(
    interface: &Interface,
    dst_hw_addr: EthernetAddress,
    dst_addr: Ipv4Address,
    tcp_repr: &TcpRepr,
    payload: &[u8],
    ttl: u8,
) -> Result<Vec<u8>> {
    let tcp_len = ipv4::payload_len(tcp_repr.header_len() + payload.len())?;

    let ipv4_repr = Ipv4Repr {
        src_addr: interface.ipv4_addr,
        dst_addr,
        protocol: Ipv4Protocol::TCP,
        payload_len: tcp_len,
    };

    ipv4::build_packet(interface, dst_hw_addr, &ipv4_repr, ttl, |tcp_buffer| {
        let mut tcp_packet = TcpPacket::try_new(tcp_buffer)?;
        (&mut tcp_packet.as_mut()[tcp_repr.header_len() ..]).copy_from_slice(payload);
        tcp_repr.serialize(&mut tcp_packet, &ipv4_repr);
        Ok(())
    })
}

/// Sends a TCP segment via a link.
pub fn send_packet<L>(
    link: &mut L,
    interface: &Interface,
    dst_hw_addr: EthernetAddress,
    dst_addr: Ipv4Address,
    tcp_repr: &TcpRepr,
    payload: &[u8],
    ttl: u8,
) -> Result<()>
where
    L: Link + ?Sized,
{
    let eth_buffer = build_packet(interface, dst_hw_addr, dst_addr, tcp_repr, payload, ttl)?;
    ethernet::send_frame(link, &eth_buffer)
}

/// Waits for a TCP segment from the peer socket address to the local port.
///
/// Frames are read until a segment with a matching port pair arrives. Any other
/// frame is skipped. Fails with `Error::HandshakeTimeout` if no segment
/// arrives within timeout.
pub fn recv_packet<L>(
    link: &mut L,
    local_port: u16,
    peer: SocketAddr,
    timeout: Duration,
) -> Result<(Ipv4Repr, TcpRepr)>
where
    L: Link + ?Sized,
{
    for eth_buffer in Frames::new(link, timeout) {
        let eth_buffer = eth_buffer?;

        match decode(&eth_buffer) {
            Ok(Layer::Tcp(ipv4_repr, tcp_repr, _))
                if tcp_repr.src_port == peer.port && tcp_repr.dst_port == local_port =>
            {
                return Ok((ipv4_repr, tcp_repr));
            }
            Ok(layer) => debug!("Ignoring {:?} while waiting on {}.", layer, peer),
            Err(err) => debug!("Ignoring frame with {:?} while waiting on {}.", err, peer),
        }
    }

    warn!("No TCP segment from {} within {:?}.", peer, timeout);
    Err(Error::HandshakeTimeout(peer))
}
