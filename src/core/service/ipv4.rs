use core::dev::Interface;
use core::repr::{
    eth_types,
    EthernetAddress,
    Ipv4Packet,
    Ipv4Repr,
};
use core::service::ethernet;
use {
    Error,
    Result,
};

/// Returns payload_len as an IPv4 payload length, or `Error::Serialization`
/// if a packet carrying it would exceed the maximum IPv4 packet size.
pub fn payload_len(payload_len: usize) -> Result<u16> {
    if Ipv4Packet::<&[u8]>::buffer_len(payload_len) > Ipv4Packet::<&[u8]>::MAX_PACKET_LEN {
        Err(Error::Serialization)
    } else {
        Ok(payload_len as u16)
    }
}

/// Builds an Ethernet frame carrying an IPv4 packet.
///
/// This function takes care of serializing a header, calculating a checksum,
/// etc. so the caller needs to fill in **only** the payload in the provided buffer.
pub fn build_packet<F>(
    interface: &Interface,
    dst_hw_addr: EthernetAddress,
    ipv4_repr: &Ipv4Repr,
    ttl: u8,
    f: F,
) -> Result<Vec<u8>>
where
    F: FnOnce(&mut [u8]) -> Result<()>,
{
    ethernet::build_frame(
        interface,
        dst_hw_addr,
        eth_types::IPV4,
        ipv4_repr.buffer_len(),
        |ipv4_buffer| {
            let mut ipv4_packet = Ipv4Packet::try_new(ipv4_buffer)?;
            // NOTE: The header must be serialized before calling payload_mut()
            // so the header length is known when locating the payload.
            ipv4_repr.serialize(&mut ipv4_packet, ttl);
            f(ipv4_packet.payload_mut())
        },
    )
}
