use byteorder::{
    NetworkEndian,
    ReadBytesExt,
    WriteBytesExt,
};

use core::repr::Ipv4Repr;
use {
    Error,
    Result,
};

/// A UDP header. length covers the header and the payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Repr {
    pub src_port: u16,
    pub dst_port: u16,
    pub length: u16,
}

impl Repr {
    /// Creates a header for a datagram carrying payload_len bytes, failing
    /// with `Error::Exhausted` if the length does not fit the length field.
    pub fn new(src_port: u16, dst_port: u16, payload_len: usize) -> Result<Repr> {
        let length = Packet::<&[u8]>::buffer_len(payload_len);
        if length > Packet::<&[u8]>::MAX_PACKET_LEN {
            return Err(Error::Exhausted);
        }

        Ok(Repr {
            src_port,
            dst_port,
            length: length as u16,
        })
    }

    /// Returns the number of bytes a serialized datagram occupies.
    pub fn buffer_len(&self) -> usize {
        self.length as usize
    }

    pub fn deserialize<T>(packet: &Packet<T>) -> Repr
    where
        T: AsRef<[u8]>,
    {
        Repr {
            src_port: packet.src_port(),
            dst_port: packet.dst_port(),
            length: packet.length(),
        }
    }

    /// Serializes the UDP header into a packet, always with a checksum over
    /// the pseudo header of ipv4_repr.
    ///
    /// The payload must already be in place so the checksum covers it.
    pub fn serialize<T>(&self, packet: &mut Packet<T>, ipv4_repr: &Ipv4Repr)
    where
        T: AsRef<[u8]> + AsMut<[u8]>,
    {
        packet.set_src_port(self.src_port);
        packet.set_dst_port(self.dst_port);
        packet.set_length(self.length);
        packet.set_checksum(0);

        // Zero on the wire means no checksum, so a computed zero goes out as
        // its one's complement twin.
        let checksum = match packet.gen_packet_checksum(ipv4_repr) {
            0 => 0xFFFF,
            checksum => checksum,
        };
        packet.set_checksum(checksum);
    }
}

/// [https://en.wikipedia.org/wiki/User_Datagram_Protocol](https://en.wikipedia.org/wiki/User_Datagram_Protocol)
mod fields {
    use std::ops::Range;

    pub const SRC_PORT: Range<usize> = 0 .. 2;

    pub const DST_PORT: Range<usize> = 2 .. 4;

    pub const LENGTH: Range<usize> = 4 .. 6;

    pub const CHECKSUM: Range<usize> = 6 .. 8;
}

/// View of a byte buffer as a UDP datagram.
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
    pub const HEADER_LEN: usize = 8;

    pub const MAX_PACKET_LEN: usize = 65535;

    pub fn try_new(buffer: T) -> Result<Packet<T>> {
        let buffer_len = buffer.as_ref().len();

        if buffer_len < Self::HEADER_LEN || buffer_len > Self::MAX_PACKET_LEN {
            Err(Error::Exhausted)
        } else {
            Ok(Packet { buffer })
        }
    }

    /// Returns the length of a UDP packet with the specified payload size.
    pub fn buffer_len(payload_len: usize) -> usize {
        Self::HEADER_LEN + payload_len
    }

    /// Checks the length field against the buffer, then the checksum unless
    /// the sender left it out.
    pub fn check_encoding(&self, ipv4_repr: &Ipv4Repr) -> Result<()> {
        if self.length() as usize != self.buffer.as_ref().len() {
            Err(Error::Malformed)
        } else if self.has_checksum() && self.gen_packet_checksum(ipv4_repr) != 0 {
            Err(Error::Checksum)
        } else {
            Ok(())
        }
    }

    /// Checks if the sender filled in the optional checksum.
    pub fn has_checksum(&self) -> bool {
        self.checksum() != 0
    }

    /// Calculates the checksum of the datagram and the pseudo header of
    /// ipv4_repr. Zero when a stored checksum is correct.
    pub fn gen_packet_checksum(&self, ipv4_repr: &Ipv4Repr) -> u16 {
        ipv4_repr.gen_checksum_with_pseudo_header(self.buffer.as_ref())
    }

    pub fn src_port(&self) -> u16 {
        self.read_u16(fields::SRC_PORT.start)
    }

    pub fn dst_port(&self) -> u16 {
        self.read_u16(fields::DST_PORT.start)
    }

    pub fn length(&self) -> u16 {
        self.read_u16(fields::LENGTH.start)
    }

    pub fn checksum(&self) -> u16 {
        self.read_u16(fields::CHECKSUM.start)
    }

    pub fn payload(&self) -> &[u8] {
        &self.buffer.as_ref()[Self::HEADER_LEN ..]
    }

    fn read_u16(&self, offset: usize) -> u16 {
        (&self.buffer.as_ref()[offset .. offset + 2])
            .read_u16::<NetworkEndian>()
            .unwrap()
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    pub fn set_src_port(&mut self, port: u16) {
        self.write_u16(fields::SRC_PORT.start, port)
    }

    pub fn set_dst_port(&mut self, port: u16) {
        self.write_u16(fields::DST_PORT.start, port)
    }

    pub fn set_length(&mut self, length: u16) {
        self.write_u16(fields::LENGTH.start, length)
    }

    pub fn set_checksum(&mut self, checksum: u16) {
        self.write_u16(fields::CHECKSUM.start, checksum)
    }

    pub fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.buffer.as_mut()[Self::HEADER_LEN ..]
    }

    fn write_u16(&mut self, offset: usize, value: u16) {
        (&mut self.buffer.as_mut()[offset .. offset + 2])
            .write_u16::<NetworkEndian>(value)
            .unwrap()
    }
}
