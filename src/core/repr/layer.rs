use core::repr::{
    eth_types,
    ipv4_protocols,
    Arp,
    EthernetAddress,
    EthernetFrame,
    Ipv4Address,
    Ipv4Packet,
    Ipv4Repr,
    TcpPacket,
    TcpRepr,
    UdpPacket,
    UdpRepr,
};
use {
    Error,
    Result,
};

/// The topmost recognized layer of a received Ethernet frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer<'a> {
    /// A frame with an EtherType other than ARP or IPv4.
    Ethernet {
        src_addr: EthernetAddress,
        payload_type: u16,
    },
    Arp(Arp),
    /// An IPv4 packet carrying neither TCP nor UDP.
    Ipv4 {
        src_addr: Ipv4Address,
        dst_addr: Ipv4Address,
        protocol: u8,
    },
    Tcp(Ipv4Repr, TcpRepr, &'a [u8]),
    Udp(Ipv4Repr, UdpRepr, &'a [u8]),
}

/// Decodes an Ethernet frame by walking EtherType and IP protocol number down
/// to the topmost ARP, IPv4, TCP or UDP layer.
///
/// Ethernet padding after an IPv4 packet is discarded and every checksum is
/// verified, so a returned layer is always well formed.
pub fn decode(eth_buffer: &[u8]) -> Result<Layer> {
    let eth_frame = EthernetFrame::try_new(eth_buffer)?;
    let eth_payload = &eth_buffer[EthernetFrame::<&[u8]>::HEADER_LEN ..];

    match eth_frame.payload_type() {
        eth_types::ARP => Ok(Layer::Arp(Arp::deserialize(eth_payload)?)),
        eth_types::IPV4 => decode_ipv4(eth_payload),
        payload_type => Ok(Layer::Ethernet {
            src_addr: eth_frame.src_addr(),
            payload_type,
        }),
    }
}

fn decode_ipv4(ipv4_buffer: &[u8]) -> Result<Layer> {
    let packet_len = Ipv4Packet::try_new(ipv4_buffer)?.packet_len() as usize;
    if packet_len > ipv4_buffer.len() {
        return Err(Error::Malformed);
    }

    let ipv4_buffer = &ipv4_buffer[.. packet_len];
    let ipv4_packet = Ipv4Packet::try_new(ipv4_buffer)?;
    ipv4_packet.check_encoding()?;

    let ipv4_payload = &ipv4_buffer[ipv4_packet.header_len() as usize * 4 ..];

    match ipv4_packet.protocol() {
        ipv4_protocols::TCP => {
            let ipv4_repr = Ipv4Repr::deserialize(&ipv4_packet)?;
            let tcp_packet = TcpPacket::try_new(ipv4_payload)?;
            tcp_packet.check_encoding(&ipv4_repr)?;
            let tcp_repr = TcpRepr::deserialize(&tcp_packet);
            let header_len = tcp_packet.data_offset() as usize * 4;
            Ok(Layer::Tcp(ipv4_repr, tcp_repr, &ipv4_payload[header_len ..]))
        }
        ipv4_protocols::UDP => {
            let ipv4_repr = Ipv4Repr::deserialize(&ipv4_packet)?;
            let udp_packet = UdpPacket::try_new(ipv4_payload)?;
            udp_packet.check_encoding(&ipv4_repr)?;
            let udp_repr = UdpRepr::deserialize(&udp_packet);
            Ok(Layer::Udp(
                ipv4_repr,
                udp_repr,
                &ipv4_payload[UdpPacket::<&[u8]>::HEADER_LEN ..],
            ))
        }
        protocol => Ok(Layer::Ipv4 {
            src_addr: ipv4_packet.src_addr(),
            dst_addr: ipv4_packet.dst_addr(),
            protocol,
        }),
    }
}

#[cfg(test)]
mod tests {
    use core::repr::{
        ArpOp,
        TcpControl,
    };

    use super::*;

    // Ethernet + IPv4 + TCP SYN+ACK from 192.168.1.1:53 to 10.0.0.5:49152,
    // seq = 2000, ack = 1001, padded to the 60 byte Ethernet minimum.
    static SYN_ACK: [u8; 60] = [
        0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xBB, 0xBB, 0xBB, 0xBB, 0xBB, 0xBB, 0x08, 0x00, 0x45,
        0x00, 0x00, 0x28, 0x00, 0x00, 0x00, 0x00, 0x40, 0x06, 0xAF, 0x22, 0xC0, 0xA8, 0x01, 0x01,
        0x0A, 0x00, 0x00, 0x05, 0x00, 0x35, 0xC0, 0x00, 0x00, 0x00, 0x07, 0xD0, 0x00, 0x00, 0x03,
        0xE9, 0x50, 0x12, 0xFF, 0xFF, 0x18, 0x36, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    ];

    #[test]
    fn test_decode_padded_tcp() {
        let (ipv4_repr, tcp_repr, payload) = match decode(&SYN_ACK[..]) {
            Ok(Layer::Tcp(ipv4_repr, tcp_repr, payload)) => (ipv4_repr, tcp_repr, payload),
            layer => panic!("Unexpected {:?}.", layer),
        };

        assert_eq!(Ipv4Address::new([192, 168, 1, 1]), ipv4_repr.src_addr);
        assert_eq!(Ipv4Address::new([10, 0, 0, 5]), ipv4_repr.dst_addr);
        assert_eq!(20, ipv4_repr.payload_len);
        assert_eq!(53, tcp_repr.src_port);
        assert_eq!(49152, tcp_repr.dst_port);
        assert_eq!(2000, tcp_repr.seq_num);
        assert_eq!(1001, tcp_repr.ack_num);
        assert_eq!(TcpControl::SYN | TcpControl::ACK, tcp_repr.control);
        assert!(payload.is_empty());
    }

    #[test]
    fn test_decode_tcp_with_bad_checksum() {
        let mut buffer = SYN_ACK;
        buffer[51] ^= 0xFF;
        assert_matches!(decode(&buffer[..]), Err(Error::Checksum));
    }

    #[test]
    fn test_decode_truncated_ipv4() {
        assert_matches!(decode(&SYN_ACK[.. 40]), Err(Error::Malformed));
    }

    #[test]
    fn test_decode_arp() {
        let buffer: [u8; 42] = [
            0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xBB, 0xBB, 0xBB, 0xBB, 0xBB, 0xBB, 0x08, 0x06,
            0x00, 0x01, 0x08, 0x00, 0x06, 0x04, 0x00, 0x02, 0xBB, 0xBB, 0xBB, 0xBB, 0xBB, 0xBB,
            0xC0, 0xA8, 0x01, 0x01, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0x0A, 0x00, 0x00, 0x05,
        ];

        match decode(&buffer[..]) {
            Ok(Layer::Arp(arp)) => {
                assert_eq!(ArpOp::Reply, arp.op);
                assert_eq!(EthernetAddress::new([0xBB; 6]), arp.source_hw_addr);
                assert_eq!(Ipv4Address::new([192, 168, 1, 1]), arp.source_proto_addr);
            }
            layer => panic!("Unexpected {:?}.", layer),
        }
    }

    #[test]
    fn test_decode_unknown_ethertype() {
        let mut buffer = SYN_ACK;
        buffer[12] = 0x86;
        buffer[13] = 0xDD;
        assert_matches!(
            decode(&buffer[..]),
            Ok(Layer::Ethernet {
                payload_type: 0x86DD,
                ..
            })
        );
    }

    #[test]
    fn test_decode_other_ipv4_protocol() {
        // ICMP echo request from 10.0.0.1 to 10.0.0.5, no payload beyond the
        // ICMP header.
        let buffer: [u8; 42] = [
            0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xBB, 0xBB, 0xBB, 0xBB, 0xBB, 0xBB, 0x08, 0x00,
            0x45, 0x00, 0x00, 0x1C, 0x00, 0x00, 0x00, 0x00, 0x40, 0x01, 0x66, 0xDC, 0x0A, 0x00,
            0x00, 0x01, 0x0A, 0x00, 0x00, 0x05, 0x08, 0x00, 0xF7, 0xFF, 0x00, 0x00, 0x00, 0x00,
        ];

        assert_matches!(
            decode(&buffer[..]),
            Ok(Layer::Ipv4 { protocol: 1, .. })
        );
    }
}
