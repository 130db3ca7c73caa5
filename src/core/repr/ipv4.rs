use std::fmt::{
    Display,
    Formatter,
    Result as FmtResult,
};
use std::net::Ipv4Addr;
use std::str::FromStr;

use byteorder::{
    NetworkEndian,
    ReadBytesExt,
    WriteBytesExt,
};

use core::check::internet_checksum;
use {
    Error,
    Result,
};

/// [IPv4 address](https://en.wikipedia.org/wiki/IPv4) in network byte order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Address([u8; 4]);

impl Address {
    /// Creates an IPv4 address from a network byte order buffer.
    pub fn new(addr: [u8; 4]) -> Address {
        Address(addr)
    }

    /// Tries to create an IPv4 address from a network byte order slice.
    pub fn try_new(addr: &[u8]) -> Result<Address> {
        if addr.len() != 4 {
            return Err(Error::Exhausted);
        }

        let mut _addr: [u8; 4] = [0; 4];
        _addr.clone_from_slice(addr);
        Ok(Address(_addr))
    }

    /// Returns a reference to the network byte order representation of the
    /// address.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}.{}.{}.{}", self.0[0], self.0[1], self.0[2], self.0[3])
    }
}

impl From<Ipv4Addr> for Address {
    fn from(addr: Ipv4Addr) -> Address {
        Address::new(addr.octets())
    }
}

impl FromStr for Address {
    type Err = Error;

    /// Parses an IPv4 address from an A.B.C.D style string.
    fn from_str(addr: &str) -> Result<Address> {
        let bytes: Vec<_> = addr.split('.')
            .map(|token| token.parse::<u8>().ok())
            .collect();

        if bytes.len() != 4 || bytes.iter().any(|byte| byte.is_none()) {
            return Err(Error::InvalidAddress(addr.to_string()));
        }

        let mut ipv4: [u8; 4] = [0; 4];
        for (i, byte) in bytes.into_iter().enumerate() {
            ipv4[i] = byte.unwrap_or(0);
        }

        Ok(Address::new(ipv4))
    }
}

/// [https://www.iana.org/assignments/protocol-numbers/protocol-numbers.xhtml](https://www.iana.org/assignments/protocol-numbers/protocol-numbers.xhtml)
pub mod protocols {
    pub const TCP: u8 = 6;

    pub const UDP: u8 = 17;
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Protocol {
    TCP = protocols::TCP,
    UDP = protocols::UDP,
}

/// Safe representation of an IPv4 header.
///
/// Options are not supported; the header is always 20 bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Repr {
    pub src_addr: Address,
    pub dst_addr: Address,
    pub protocol: Protocol,
    pub payload_len: u16,
}

impl Repr {
    /// Returns the size of the IPv4 packet when serialized to a buffer.
    pub fn buffer_len(&self) -> usize {
        Packet::<&[u8]>::MIN_HEADER_LEN + self.payload_len as usize
    }

    /// Tries to deserialize a packet into an IPv4 header.
    pub fn deserialize<T>(packet: &Packet<T>) -> Result<Repr>
    where
        T: AsRef<[u8]>,
    {
        let protocol = match packet.protocol() {
            protocols::TCP => Protocol::TCP,
            protocols::UDP => Protocol::UDP,
            _ => return Err(Error::Malformed),
        };

        Ok(Repr {
            src_addr: packet.src_addr(),
            dst_addr: packet.dst_addr(),
            protocol,
            payload_len: packet
                .packet_len()
                .saturating_sub(packet.header_len() as u16 * 4),
        })
    }

    /// Serializes the IPv4 header into a packet and performs a checksum update.
    pub fn serialize<T>(&self, packet: &mut Packet<T>, ttl: u8)
    where
        T: AsRef<[u8]> + AsMut<[u8]>,
    {
        packet.set_ip_version(4);
        packet.set_header_len(5);
        packet.set_type_of_service(0);
        packet.set_packet_len(self.buffer_len() as u16);
        packet.set_unfragmented();
        packet.set_ttl(ttl);
        packet.set_protocol(self.protocol as u8);
        packet.set_src_addr(self.src_addr);
        packet.set_dst_addr(self.dst_addr);
        packet.set_header_checksum(0);

        let checksum = packet.gen_header_checksum();
        packet.set_header_checksum(checksum);
    }

    /// Calculates a transport layer checksum over an IPv4 pseudo-header
    /// followed by the transport header and payload.
    pub fn gen_checksum_with_pseudo_header(&self, buffer: &[u8]) -> u16 {
        let mut ip_pseudo_header = [0; 12];
        (&mut ip_pseudo_header[0 .. 4]).copy_from_slice(self.src_addr.as_bytes());
        (&mut ip_pseudo_header[4 .. 8]).copy_from_slice(self.dst_addr.as_bytes());
        ip_pseudo_header[9] = self.protocol as u8;
        (&mut ip_pseudo_header[10 .. 12])
            .write_u16::<NetworkEndian>(self.payload_len)
            .unwrap();

        let iter = ip_pseudo_header.iter().chain(buffer.iter()).cloned();
        internet_checksum(iter)
    }
}

/// [https://en.wikipedia.org/wiki/IPv4#Header](https://en.wikipedia.org/wiki/IPv4#Header)
mod fields {
    use std::ops::Range;

    pub const VERSION_AND_HEADER_LEN: usize = 0;

    /// DSCP and ECN.
    pub const TYPE_OF_SERVICE: usize = 1;

    pub const PACKET_LEN: Range<usize> = 2 .. 4;

    /// Identification, flags and fragment offset.
    pub const FRAGMENTATION: Range<usize> = 4 .. 8;

    pub const TTL: usize = 8;

    pub const PROTOCOL: usize = 9;

    pub const CHECKSUM: Range<usize> = 10 .. 12;

    pub const SRC_ADDR: Range<usize> = 12 .. 16;

    pub const DST_ADDR: Range<usize> = 16 .. 20;
}

/// View of a byte buffer as an IPv4 packet.
#[derive(Debug)]
pub struct Packet<T: AsRef<[u8]>> {
    buffer: T,
}

impl<T: AsRef<[u8]>> AsRef<[u8]> for Packet<T> {
    fn as_ref(&self) -> &[u8] {
        self.buffer.as_ref()
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> AsMut<[u8]> for Packet<T> {
    fn as_mut(&mut self) -> &mut [u8] {
        self.buffer.as_mut()
    }
}

impl<T: AsRef<[u8]>> Packet<T> {
    pub const MIN_HEADER_LEN: usize = 20;

    pub const MAX_PACKET_LEN: usize = 65535;

    /// Tries to create an IPv4 packet view over a byte buffer.
    ///
    /// NOTE: Use check_encoding() before operating on the packet if the buffer
    /// originates from an untrusted source like a link.
    pub fn try_new(buffer: T) -> Result<Packet<T>> {
        let buffer_len = buffer.as_ref().len();

        if buffer_len < Self::MIN_HEADER_LEN || buffer_len > Self::MAX_PACKET_LEN {
            Err(Error::Exhausted)
        } else {
            Ok(Packet { buffer })
        }
    }

    /// Returns the length of an IPv4 packet with no options and the specified
    /// payload size.
    pub fn buffer_len(payload_len: usize) -> usize {
        Self::MIN_HEADER_LEN + payload_len
    }

    /// Checks if the packet has a valid encoding. This may include checksum,
    /// field consistency, etc. checks.
    pub fn check_encoding(&self) -> Result<()> {
        let header_len = self.header_len() as usize * 4;

        if self.ip_version() != 4
            || header_len < Self::MIN_HEADER_LEN
            || header_len > self.buffer.as_ref().len()
            || self.packet_len() as usize != self.buffer.as_ref().len()
        {
            Err(Error::Malformed)
        } else if self.gen_header_checksum() != 0 {
            Err(Error::Checksum)
        } else {
            Ok(())
        }
    }

    /// Calculates the header checksum.
    pub fn gen_header_checksum(&self) -> u16 {
        let header_len = (self.header_len() as usize * 4).min(self.buffer.as_ref().len());
        internet_checksum(self.buffer.as_ref()[.. header_len].iter().cloned())
    }

    pub fn ip_version(&self) -> u8 {
        self.buffer.as_ref()[fields::VERSION_AND_HEADER_LEN] >> 4
    }

    /// Returns the header length in 32 bit words.
    pub fn header_len(&self) -> u8 {
        self.buffer.as_ref()[fields::VERSION_AND_HEADER_LEN] & 0x0F
    }

    pub fn packet_len(&self) -> u16 {
        (&self.buffer.as_ref()[fields::PACKET_LEN])
            .read_u16::<NetworkEndian>()
            .unwrap()
    }

    pub fn ttl(&self) -> u8 {
        self.buffer.as_ref()[fields::TTL]
    }

    pub fn protocol(&self) -> u8 {
        self.buffer.as_ref()[fields::PROTOCOL]
    }

    pub fn src_addr(&self) -> Address {
        let mut addr = [0; 4];
        addr.copy_from_slice(&self.buffer.as_ref()[fields::SRC_ADDR]);
        Address::new(addr)
    }

    pub fn dst_addr(&self) -> Address {
        let mut addr = [0; 4];
        addr.copy_from_slice(&self.buffer.as_ref()[fields::DST_ADDR]);
        Address::new(addr)
    }

    pub fn payload(&self) -> &[u8] {
        let header_len = self.header_len() as usize * 4;
        &self.buffer.as_ref()[header_len ..]
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    pub fn set_ip_version(&mut self, version: u8) {
        let byte = &mut self.buffer.as_mut()[fields::VERSION_AND_HEADER_LEN];
        *byte = (*byte & 0x0F) | (version << 4);
    }

    pub fn set_header_len(&mut self, header_len: u8) {
        let byte = &mut self.buffer.as_mut()[fields::VERSION_AND_HEADER_LEN];
        *byte = (*byte & 0xF0) | (header_len & 0x0F);
    }

    pub fn set_type_of_service(&mut self, tos: u8) {
        self.buffer.as_mut()[fields::TYPE_OF_SERVICE] = tos;
    }

    pub fn set_packet_len(&mut self, packet_len: u16) {
        (&mut self.buffer.as_mut()[fields::PACKET_LEN])
            .write_u16::<NetworkEndian>(packet_len)
            .unwrap()
    }

    /// Zeroes identification, flags (DF included) and fragment offset.
    pub fn set_unfragmented(&mut self) {
        for byte in &mut self.buffer.as_mut()[fields::FRAGMENTATION] {
            *byte = 0;
        }
    }

    pub fn set_ttl(&mut self, ttl: u8) {
        self.buffer.as_mut()[fields::TTL] = ttl;
    }

    pub fn set_protocol(&mut self, protocol: u8) {
        self.buffer.as_mut()[fields::PROTOCOL] = protocol;
    }

    pub fn set_header_checksum(&mut self, checksum: u16) {
        (&mut self.buffer.as_mut()[fields::CHECKSUM])
            .write_u16::<NetworkEndian>(checksum)
            .unwrap()
    }

    pub fn set_src_addr(&mut self, addr: Address) {
        (&mut self.buffer.as_mut()[fields::SRC_ADDR]).copy_from_slice(addr.as_bytes());
    }

    pub fn set_dst_addr(&mut self, addr: Address) {
        (&mut self.buffer.as_mut()[fields::DST_ADDR]).copy_from_slice(addr.as_bytes());
    }

    pub fn payload_mut(&mut self) -> &mut [u8] {
        let header_len = self.header_len() as usize * 4;
        &mut self.buffer.as_mut()[header_len ..]
    }
}
