use std::fmt;
use std::ops::BitOr;

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

/// The 9 control bits of a TCP header, NS through FIN.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Control(u16);

impl Control {
    pub const FIN: Control = Control(1 << 0);

    pub const SYN: Control = Control(1 << 1);

    pub const RST: Control = Control(1 << 2);

    pub const PSH: Control = Control(1 << 3);

    pub const ACK: Control = Control(1 << 4);

    pub const URG: Control = Control(1 << 5);

    pub const ECE: Control = Control(1 << 6);

    pub const CWR: Control = Control(1 << 7);

    pub const NS: Control = Control(1 << 8);

    const MASK: u16 = 0x01FF;

    const NAMES: [(Control, &'static str); 9] = [
        (Control::NS, "NS"),
        (Control::CWR, "CWR"),
        (Control::ECE, "ECE"),
        (Control::URG, "URG"),
        (Control::ACK, "ACK"),
        (Control::PSH, "PSH"),
        (Control::RST, "RST"),
        (Control::SYN, "SYN"),
        (Control::FIN, "FIN"),
    ];

    /// Creates a control set from raw bits, ignoring anything past the NS bit.
    pub fn from_bits(bits: u16) -> Control {
        Control(bits & Self::MASK)
    }

    pub fn bits(&self) -> u16 {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Checks if every bit of other is also set in self.
    pub fn contains(&self, other: Control) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Control {
    type Output = Control;

    fn bitor(self, rhs: Control) -> Control {
        Control(self.0 | rhs.0)
    }
}

impl fmt::Debug for Control {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Control({})", self)
    }
}

impl fmt::Display for Control {
    /// Writes the set bits as "SYN|ACK", or "-" when none are set.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }

        let mut first = true;
        for (control, name) in Self::NAMES.iter() {
            if self.contains(*control) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{}", name)?;
                first = false;
            }
        }

        Ok(())
    }
}

/// A TCP header without options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Repr {
    pub src_port: u16,
    pub dst_port: u16,
    pub seq_num: u32,
    pub ack_num: u32,
    pub control: Control,
    pub window_size: u16,
    pub urgent_pointer: u16,
}

impl Repr {
    /// Returns the length of the TCP header when serialized to a buffer.
    pub fn header_len(&self) -> usize {
        Packet::<&[u8]>::MIN_HEADER_LEN
    }

    /// Deserializes a packet into a TCP header. Options are skipped.
    pub fn deserialize<T>(packet: &Packet<T>) -> Repr
    where
        T: AsRef<[u8]>,
    {
        Repr {
            src_port: packet.src_port(),
            dst_port: packet.dst_port(),
            seq_num: packet.seq_num(),
            ack_num: packet.ack_num(),
            control: packet.control(),
            window_size: packet.window_size(),
            urgent_pointer: packet.urgent_pointer(),
        }
    }

    /// Serializes the TCP header into a packet and fills in the checksum over
    /// the pseudo header of ipv4_repr.
    ///
    /// The payload must already be in place so the checksum covers it.
    pub fn serialize<T>(&self, packet: &mut Packet<T>, ipv4_repr: &Ipv4Repr)
    where
        T: AsRef<[u8]> + AsMut<[u8]>,
    {
        packet.set_src_port(self.src_port);
        packet.set_dst_port(self.dst_port);
        packet.set_seq_num(self.seq_num);
        packet.set_ack_num(self.ack_num);
        packet.set_offset_and_control((self.header_len() / 4) as u8, self.control);
        packet.set_window_size(self.window_size);
        packet.set_checksum(0);
        packet.set_urgent_pointer(self.urgent_pointer);

        let checksum = packet.gen_packet_checksum(ipv4_repr);
        packet.set_checksum(checksum);
    }
}

/// [https://en.wikipedia.org/wiki/Transmission_Control_Protocol#TCP_segment_structure](https://en.wikipedia.org/wiki/Transmission_Control_Protocol#TCP_segment_structure)
mod fields {
    use std::ops::Range;

    pub const SRC_PORT: Range<usize> = 0 .. 2;

    pub const DST_PORT: Range<usize> = 2 .. 4;

    pub const SEQ_NUM: Range<usize> = 4 .. 8;

    pub const ACK_NUM: Range<usize> = 8 .. 12;

    /// Data offset in the top 4 bits, 3 reserved bits, then the control bits.
    pub const OFFSET_AND_CONTROL: Range<usize> = 12 .. 14;

    pub const WINDOW_SIZE: Range<usize> = 14 .. 16;

    pub const CHECKSUM: Range<usize> = 16 .. 18;

    pub const URGENT_POINTER: Range<usize> = 18 .. 20;
}

/// View of a byte buffer as a TCP segment.
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

    /// Tries to create a TCP packet from a byte buffer.
    ///
    /// Buffers read off a link should pass check_encoding() before the
    /// payload is touched.
    pub fn try_new(buffer: T) -> Result<Packet<T>> {
        if buffer.as_ref().len() < Self::MIN_HEADER_LEN {
            Err(Error::Exhausted)
        } else {
            Ok(Packet { buffer })
        }
    }

    /// Returns the length of a TCP packet with no options and the specified
    /// payload size.
    pub fn buffer_len(payload_len: usize) -> usize {
        Self::MIN_HEADER_LEN + payload_len
    }

    /// Checks the data offset against the buffer and verifies the checksum.
    pub fn check_encoding(&self, ipv4_repr: &Ipv4Repr) -> Result<()> {
        let header_len = self.header_len();

        if header_len < Self::MIN_HEADER_LEN || header_len > self.buffer.as_ref().len() {
            Err(Error::Malformed)
        } else if self.gen_packet_checksum(ipv4_repr) != 0 {
            Err(Error::Checksum)
        } else {
            Ok(())
        }
    }

    /// Calculates the checksum of the segment and the pseudo header of
    /// ipv4_repr. Zero when a stored checksum is correct.
    pub fn gen_packet_checksum(&self, ipv4_repr: &Ipv4Repr) -> u16 {
        ipv4_repr.gen_checksum_with_pseudo_header(self.buffer.as_ref())
    }

    pub fn src_port(&self) -> u16 {
        (&self.buffer.as_ref()[fields::SRC_PORT])
            .read_u16::<NetworkEndian>()
            .unwrap()
    }

    pub fn dst_port(&self) -> u16 {
        (&self.buffer.as_ref()[fields::DST_PORT])
            .read_u16::<NetworkEndian>()
            .unwrap()
    }

    pub fn seq_num(&self) -> u32 {
        (&self.buffer.as_ref()[fields::SEQ_NUM])
            .read_u32::<NetworkEndian>()
            .unwrap()
    }

    pub fn ack_num(&self) -> u32 {
        (&self.buffer.as_ref()[fields::ACK_NUM])
            .read_u32::<NetworkEndian>()
            .unwrap()
    }

    /// Header length in 32 bit words.
    pub fn data_offset(&self) -> u8 {
        (self.offset_and_control() >> 12) as u8
    }

    /// Header length in bytes, options included.
    pub fn header_len(&self) -> usize {
        self.data_offset() as usize * 4
    }

    pub fn control(&self) -> Control {
        Control::from_bits(self.offset_and_control())
    }

    pub fn window_size(&self) -> u16 {
        (&self.buffer.as_ref()[fields::WINDOW_SIZE])
            .read_u16::<NetworkEndian>()
            .unwrap()
    }

    pub fn checksum(&self) -> u16 {
        (&self.buffer.as_ref()[fields::CHECKSUM])
            .read_u16::<NetworkEndian>()
            .unwrap()
    }

    pub fn urgent_pointer(&self) -> u16 {
        (&self.buffer.as_ref()[fields::URGENT_POINTER])
            .read_u16::<NetworkEndian>()
            .unwrap()
    }

    pub fn payload(&self) -> &[u8] {
        &self.buffer.as_ref()[self.header_len() ..]
    }

    fn offset_and_control(&self) -> u16 {
        (&self.buffer.as_ref()[fields::OFFSET_AND_CONTROL])
            .read_u16::<NetworkEndian>()
            .unwrap()
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    pub fn set_src_port(&mut self, port: u16) {
        (&mut self.buffer.as_mut()[fields::SRC_PORT])
            .write_u16::<NetworkEndian>(port)
            .unwrap()
    }

    pub fn set_dst_port(&mut self, port: u16) {
        (&mut self.buffer.as_mut()[fields::DST_PORT])
            .write_u16::<NetworkEndian>(port)
            .unwrap()
    }

    pub fn set_seq_num(&mut self, seq_num: u32) {
        (&mut self.buffer.as_mut()[fields::SEQ_NUM])
            .write_u32::<NetworkEndian>(seq_num)
            .unwrap()
    }

    pub fn set_ack_num(&mut self, ack_num: u32) {
        (&mut self.buffer.as_mut()[fields::ACK_NUM])
            .write_u32::<NetworkEndian>(ack_num)
            .unwrap()
    }

    /// Writes the data offset (in 32 bit words) and control bits together,
    /// clearing the reserved bits.
    pub fn set_offset_and_control(&mut self, data_offset: u8, control: Control) {
        let value = (u16::from(data_offset & 0x0F) << 12) | control.bits();
        (&mut self.buffer.as_mut()[fields::OFFSET_AND_CONTROL])
            .write_u16::<NetworkEndian>(value)
            .unwrap()
    }

    pub fn set_window_size(&mut self, window_size: u16) {
        (&mut self.buffer.as_mut()[fields::WINDOW_SIZE])
            .write_u16::<NetworkEndian>(window_size)
            .unwrap()
    }

    pub fn set_checksum(&mut self, checksum: u16) {
        (&mut self.buffer.as_mut()[fields::CHECKSUM])
            .write_u16::<NetworkEndian>(checksum)
            .unwrap()
    }

    pub fn set_urgent_pointer(&mut self, urgent_pointer: u16) {
        (&mut self.buffer.as_mut()[fields::URGENT_POINTER])
            .write_u16::<NetworkEndian>(urgent_pointer)
            .unwrap()
    }

    pub fn payload_mut(&mut self) -> &mut [u8] {
        let header_len = self.header_len();
        &mut self.buffer.as_mut()[header_len ..]
    }
}

#[cfg(test)]
mod tests {
    use core::repr::{
        Ipv4Address,
        Ipv4Protocol,
    };

    use super::*;

    fn ipv4_repr(payload_len: usize) -> Ipv4Repr {
        Ipv4Repr {
            src_addr: Ipv4Address::new([10, 0, 0, 5]),
            dst_addr: Ipv4Address::new([192, 168, 1, 1]),
            protocol: Ipv4Protocol::TCP,
            payload_len: payload_len as u16,
        }
    }

    fn syn_repr() -> Repr {
        Repr {
            src_port: 49152,
            dst_port: 53,
            seq_num: 1000,
            ack_num: 0,
            control: Control::SYN,
            window_size: 65535,
            urgent_pointer: 0,
        }
    }

    #[test]
    fn test_control_ops() {
        let control = Control::SYN | Control::ACK;
        assert!(control.contains(Control::SYN));
        assert!(control.contains(Control::ACK));
        assert!(!control.contains(Control::FIN));
        assert!(!control.contains(Control::SYN | Control::FIN));
        assert_eq!(0x0012, control.bits());

        assert_eq!(Control::from_bits(0x01FF), Control::from_bits(0xFFFF));
        assert!(Control::default().is_empty());
    }

    #[test]
    fn test_control_display() {
        assert_eq!("SYN", format!("{}", Control::SYN));
        assert_eq!("ACK|SYN", format!("{}", Control::SYN | Control::ACK));
        assert_eq!("ACK|FIN", format!("{}", Control::FIN | Control::ACK));
        assert_eq!("-", format!("{}", Control::default()));
    }

    #[test]
    fn test_packet_with_buffer_less_than_min_header() {
        let buffer: [u8; 19] = [0; 19];
        let packet = Packet::try_new(&buffer[..]);
        assert_matches!(packet, Err(Error::Exhausted));
    }

    #[test]
    fn test_packet_with_data_offset_past_buffer() {
        let mut buffer: [u8; 20] = [0; 20];
        buffer[12] = 0x60;
        let packet = Packet::try_new(&buffer[..]).unwrap();
        assert_matches!(packet.check_encoding(&ipv4_repr(20)), Err(Error::Malformed));
    }

    #[test]
    fn test_packet_with_data_offset_below_min_header() {
        let mut buffer: [u8; 20] = [0; 20];
        buffer[12] = 0x40;
        let packet = Packet::try_new(&buffer[..]).unwrap();
        assert_matches!(packet.check_encoding(&ipv4_repr(20)), Err(Error::Malformed));
    }

    #[test]
    fn test_packet_with_invalid_checksum() {
        let mut buffer = [0; 24];
        {
            let mut packet = Packet::try_new(&mut buffer[..]).unwrap();
            packet.payload_mut().copy_from_slice(b"ping");
            syn_repr().serialize(&mut packet, &ipv4_repr(24));
        }

        buffer[23] ^= 0x01;
        let packet = Packet::try_new(&buffer[..]).unwrap();
        assert_matches!(packet.check_encoding(&ipv4_repr(24)), Err(Error::Checksum));
    }

    #[test]
    fn test_packet_getters() {
        let buffer: [u8; 24] = [
            0xC0, 0x00, 0x00, 0x35, 0x00, 0x00, 0x03, 0xE8, 0x00, 0x00, 0x07, 0xD1, 0x51, 0xFF,
            0xFF, 0xFF, 0x12, 0x34, 0x00, 0x07, 0x70, 0x69, 0x6E, 0x67,
        ];

        let packet = Packet::try_new(&buffer[..]).unwrap();

        assert_eq!(49152, packet.src_port());
        assert_eq!(53, packet.dst_port());
        assert_eq!(1000, packet.seq_num());
        assert_eq!(2001, packet.ack_num());
        assert_eq!(5, packet.data_offset());
        assert_eq!(20, packet.header_len());
        assert_eq!(Control::from_bits(0x01FF), packet.control());
        assert!(packet.control().contains(Control::NS | Control::SYN | Control::FIN));
        assert_eq!(65535, packet.window_size());
        assert_eq!(0x1234, packet.checksum());
        assert_eq!(7, packet.urgent_pointer());
        assert_eq!(b"ping", packet.payload());
    }

    #[test]
    fn test_packet_setters() {
        let mut buffer: [u8; 24] = [0xFF; 24];

        {
            let mut packet = Packet::try_new(&mut buffer[..]).unwrap();
            packet.set_src_port(49152);
            packet.set_dst_port(53);
            packet.set_seq_num(1000);
            packet.set_ack_num(2001);
            packet.set_offset_and_control(5, Control::SYN | Control::ACK);
            packet.set_window_size(65535);
            packet.set_checksum(0x1234);
            packet.set_urgent_pointer(7);
            packet.payload_mut().copy_from_slice(b"ping");
        }

        assert_eq!(
            &buffer[..],
            &[
                0xC0, 0x00, 0x00, 0x35, 0x00, 0x00, 0x03, 0xE8, 0x00, 0x00, 0x07, 0xD1, 0x50,
                0x12, 0xFF, 0xFF, 0x12, 0x34, 0x00, 0x07, 0x70, 0x69, 0x6E, 0x67,
            ][..]
        );
    }

    #[test]
    fn test_repr_serialize_verifies() {
        let repr = syn_repr();

        let mut buffer = [0; 20];
        let mut packet = Packet::try_new(&mut buffer[..]).unwrap();
        repr.serialize(&mut packet, &ipv4_repr(20));

        assert_matches!(packet.check_encoding(&ipv4_repr(20)), Ok(_));
        assert_eq!(0x50, packet.as_ref()[12]);
        assert_eq!(0x02, packet.as_ref()[13]);
        assert_eq!(repr, Repr::deserialize(&packet));
    }

    #[test]
    fn test_repr_checksum_depends_on_pseudo_header() {
        let mut buffer = [0; 20];
        let mut packet = Packet::try_new(&mut buffer[..]).unwrap();
        syn_repr().serialize(&mut packet, &ipv4_repr(20));

        let other = Ipv4Repr {
            src_addr: Ipv4Address::new([10, 0, 0, 6]),
            ..ipv4_repr(20)
        };
        assert_matches!(packet.check_encoding(&other), Err(Error::Checksum));
    }
}
