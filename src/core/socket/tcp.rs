use std::fmt::{
    Display,
    Formatter,
    Result as FmtResult,
};

use core::config::Config;
use core::dev::{
    Host,
    Interface,
};
use core::repr::{
    EthernetAddress,
    Ipv4Address,
    TcpControl,
    TcpRepr,
};
use core::service::{
    arp,
    tcp,
};
use core::socket::SocketAddr;
use {
    Error,
    Result,
};

/// The flag combinations a TCP session sends and reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flags {
    Syn,
    Ack,
    Fin,
    SynAck,
    FinAck,
}

impl Flags {
    /// Returns the control bits a segment with these flags carries.
    pub fn control(self) -> TcpControl {
        match self {
            Flags::Syn => TcpControl::SYN,
            Flags::Ack => TcpControl::ACK,
            Flags::Fin => TcpControl::FIN,
            Flags::SynAck => TcpControl::SYN | TcpControl::ACK,
            Flags::FinAck => TcpControl::FIN | TcpControl::ACK,
        }
    }

    pub fn fin(self) -> bool {
        self.control().contains(TcpControl::FIN)
    }
}

impl Display for Flags {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        let flags = match *self {
            Flags::Syn => "SYN",
            Flags::Ack => "ACK",
            Flags::Fin => "FIN",
            Flags::SynAck => "SYN+ACK",
            Flags::FinAck => "FIN+ACK",
        };
        write!(f, "{}", flags)
    }
}

/// Describes a segment to send, or the sequence state after sending one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    pub dst_addr: Ipv4Address,
    pub dst_port: u16,
    pub flags: Flags,
    pub seq_num: u32,
    pub ack_num: u32,
}

impl Segment {
    pub fn new(
        dst_addr: Ipv4Address,
        dst_port: u16,
        flags: Flags,
        seq_num: u32,
        ack_num: u32,
    ) -> Segment {
        Segment {
            dst_addr,
            dst_port,
            flags,
            seq_num,
            ack_num,
        }
    }

    /// Returns the same segment with different flags, i.e. to close a
    /// connection with the sequence state a handshake returned.
    pub fn with_flags(self, flags: Flags) -> Segment {
        Segment { flags, ..self }
    }

    pub fn dst_socket_addr(&self) -> SocketAddr {
        SocketAddr {
            addr: self.dst_addr,
            port: self.dst_port,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Idle,
    AwaitingSynAck,
    Established,
    Closing,
}

/// The hardware address of the session peer, resolved on first use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeerHwAddr {
    Unresolved,
    Resolved {
        ipv4_addr: Ipv4Address,
        ethernet_addr: EthernetAddress,
    },
}

/// A TCP connection driven by hand over a raw link.
///
/// Only the three way handshake and a FIN+ACK teardown are supported. There is
/// no retransmission, windowing or data transfer. The session opens its link
/// and resolves its peer lazily on the first call to negotiate(...) and owns
/// the link until closed or dropped.
pub struct TcpSession<H: Host> {
    host: H,
    ifr_name: String,
    src_port: u16,
    config: Config,
    interface: Option<Interface>,
    link: Option<H::Link>,
    closed: bool,
    peer_hw_addr: PeerHwAddr,
    seq_num: u32,
    ack_num: u32,
    state: State,
}

impl<H: Host> TcpSession<H> {
    /// Creates a session on an interface without touching the network.
    pub fn open(host: H, ifr_name: &str, src_port: u16) -> TcpSession<H> {
        Self::with_config(host, ifr_name, src_port, Config::default())
    }

    pub fn with_config(host: H, ifr_name: &str, src_port: u16, config: Config) -> TcpSession<H> {
        TcpSession {
            host,
            ifr_name: ifr_name.to_string(),
            src_port,
            config,
            interface: None,
            link: None,
            closed: false,
            peer_hw_addr: PeerHwAddr::Unresolved,
            seq_num: config.initial_seq_num,
            ack_num: 0,
            state: State::Idle,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn seq_num(&self) -> u32 {
        self.seq_num
    }

    pub fn ack_num(&self) -> u32 {
        self.ack_num
    }

    pub fn src_port(&self) -> u16 {
        self.src_port
    }

    pub fn peer_hw_addr(&self) -> PeerHwAddr {
        self.peer_hw_addr
    }

    /// Returns the addresses of the session interface once looked up.
    pub fn interface(&self) -> Option<&Interface> {
        self.interface.as_ref()
    }

    /// Sends a segment with the requested flags and the current sequence
    /// state to the segment destination.
    ///
    /// A SYN blocks until a segment from the destination port to the session
    /// port arrives, answers it with an ACK and returns the new sequence state
    /// tagged as SYN+ACK. Any other flags return the current sequence state
    /// right away. A FIN only moves an established session to closing.
    pub fn negotiate(&mut self, segment: &Segment) -> Result<Segment> {
        let peer = segment.dst_socket_addr();
        let dst_hw_addr = self.setup(peer.addr)?;

        self.send(peer, dst_hw_addr, segment.flags)?;

        match segment.flags {
            Flags::Syn => {
                self.transition(State::AwaitingSynAck);

                let tcp_repr = self.recv(peer)?;
                if !tcp_repr.control.contains(TcpControl::SYN | TcpControl::ACK) {
                    warn!(
                        "Reply from {} to port {} is not a SYN+ACK, continuing anyway.",
                        peer, self.src_port
                    );
                }

                self.seq_num = segment.seq_num.wrapping_add(1);
                self.ack_num = tcp_repr.seq_num.wrapping_add(1);
                self.send(peer, dst_hw_addr, Flags::Ack)?;
                self.transition(State::Established);

                info!(
                    "Established connection from port {} to {} with seq = {}, ack = {}.",
                    self.src_port, peer, self.seq_num, self.ack_num
                );

                Ok(Segment {
                    flags: Flags::SynAck,
                    seq_num: self.seq_num,
                    ack_num: self.ack_num,
                    ..*segment
                })
            }
            flags => {
                if flags.fin() && self.state == State::Established {
                    self.transition(State::Closing);
                }

                Ok(Segment {
                    seq_num: self.seq_num,
                    ack_num: self.ack_num,
                    ..*segment
                })
            }
        }
    }

    /// Releases the link. Closing more than once has no effect.
    pub fn close(&mut self) {
        self.closed = true;
        if let Some(link) = self.link.take() {
            debug!("Closing link on {} for port {}.", self.ifr_name, self.src_port);
            drop(link);
        }
    }

    /// Looks up the interface, opens the link and resolves the peer hardware
    /// address, reusing whatever earlier calls established.
    fn setup(&mut self, dst_addr: Ipv4Address) -> Result<EthernetAddress> {
        if self.closed {
            return Err(Error::Closed);
        }

        if self.interface.is_none() {
            let interface = self.host.lookup(&self.ifr_name)?;
            debug!(
                "Interface {} has addresses {}/{}.",
                interface.name, interface.ipv4_addr, interface.ethernet_addr
            );
            self.interface = Some(interface);
        }

        if self.link.is_none() {
            debug!("Opening link on {} for port {}.", self.ifr_name, self.src_port);
            self.link = Some(self.host.open(&self.ifr_name)?);
        }

        if let PeerHwAddr::Resolved {
            ipv4_addr,
            ethernet_addr,
        } = self.peer_hw_addr
        {
            if ipv4_addr == dst_addr {
                return Ok(ethernet_addr);
            }
        }

        let ethernet_addr = match (self.link.as_mut(), self.interface.as_ref()) {
            (Some(link), Some(interface)) => {
                arp::resolve(link, interface, dst_addr, self.config.arp_timeout)?
            }
            _ => return Err(Error::Closed),
        };

        info!("Resolved {} to {}.", dst_addr, ethernet_addr);
        self.peer_hw_addr = PeerHwAddr::Resolved {
            ipv4_addr: dst_addr,
            ethernet_addr,
        };

        Ok(ethernet_addr)
    }

    fn send(&mut self, peer: SocketAddr, dst_hw_addr: EthernetAddress, flags: Flags) -> Result<()> {
        let tcp_repr = TcpRepr {
            src_port: self.src_port,
            dst_port: peer.port,
            seq_num: self.seq_num,
            ack_num: self.ack_num,
            control: flags.control(),
            window_size: self.config.window_size,
            urgent_pointer: 0,
        };

        debug!(
            "Sending {} from port {} to {} with seq = {}, ack = {}.",
            flags, self.src_port, peer, self.seq_num, self.ack_num
        );

        match (self.link.as_mut(), self.interface.as_ref()) {
            (Some(link), Some(interface)) => tcp::send_packet(
                link,
                interface,
                dst_hw_addr,
                peer.addr,
                &tcp_repr,
                &[],
                self.config.ttl,
            ),
            _ => Err(Error::Closed),
        }
    }

    fn recv(&mut self, peer: SocketAddr) -> Result<TcpRepr> {
        match self.link.as_mut() {
            Some(link) => {
                tcp::recv_packet(link, self.src_port, peer, self.config.handshake_timeout)
                    .map(|(_, tcp_repr)| tcp_repr)
            }
            None => Err(Error::Closed),
        }
    }

    fn transition(&mut self, state: State) {
        debug!(
            "Port {} moving from {:?} to {:?}.",
            self.src_port, self.state, state
        );
        self.state = state;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use core::mock::{
        MockHost,
        Peer,
    };
    use core::repr::{
        decode,
        Layer,
    };

    use super::*;

    fn config() -> Config {
        Config {
            arp_timeout: Duration::from_millis(100),
            handshake_timeout: Duration::from_millis(100),
            ..Config::default()
        }
    }

    fn host() -> MockHost {
        let host = MockHost::new();
        host.add_interface(Interface {
            name: "en0".to_string(),
            ethernet_addr: EthernetAddress::new([0xAA; 6]),
            ipv4_addr: Ipv4Address::new([10, 0, 0, 5]),
        });
        host
    }

    fn peer() -> Peer {
        Peer::new(
            EthernetAddress::new([0xBB; 6]),
            Ipv4Address::new([192, 168, 1, 1]),
        )
    }

    fn syn() -> Segment {
        Segment::new(Ipv4Address::new([192, 168, 1, 1]), 53, Flags::Syn, 1000, 0)
    }

    #[test]
    fn test_flags_control() {
        assert_eq!(TcpControl::SYN, Flags::Syn.control());
        assert_eq!(TcpControl::SYN | TcpControl::ACK, Flags::SynAck.control());
        assert_eq!(TcpControl::FIN | TcpControl::ACK, Flags::FinAck.control());
        assert!(Flags::Fin.fin());
        assert!(Flags::FinAck.fin());
        assert!(!Flags::SynAck.fin());
    }

    #[test]
    fn test_segment_with_flags() {
        let segment = Segment::new(Ipv4Address::new([192, 168, 1, 1]), 53, Flags::SynAck, 1001, 2001);
        let fin_ack = segment.with_flags(Flags::FinAck);
        assert_eq!(Flags::FinAck, fin_ack.flags);
        assert_eq!(1001, fin_ack.seq_num);
        assert_eq!(2001, fin_ack.ack_num);
        assert_eq!(segment.dst_socket_addr(), fin_ack.dst_socket_addr());
    }

    #[test]
    fn test_open_is_lazy() {
        let host = host();
        let session = TcpSession::open(&host, "en0", 49152);
        assert_eq!(State::Idle, session.state());
        assert_eq!(1000, session.seq_num());
        assert_eq!(0, session.ack_num());
        assert_eq!(PeerHwAddr::Unresolved, session.peer_hw_addr());
        assert_eq!(0, host.links_opened());
        assert!(host.sent_frames().is_empty());
    }

    #[test]
    fn test_negotiate_after_close() {
        let host = host();
        let mut session = TcpSession::with_config(&host, "en0", 49152, config());
        session.close();
        assert_matches!(session.negotiate(&syn()), Err(Error::Closed));
        assert_eq!(0, host.links_opened());
    }

    #[test]
    fn test_negotiate_unknown_interface() {
        let host = host();
        let mut session = TcpSession::with_config(&host, "en1", 49152, config());
        assert_matches!(session.negotiate(&syn()), Err(Error::InterfaceLookup(_)));
        assert_eq!(State::Idle, session.state());
    }

    #[test]
    fn test_negotiate_handshake_timeout_keeps_link() {
        let host = host();
        host.add_peer(peer());

        let mut session = TcpSession::with_config(&host, "en0", 49152, config());
        assert_matches!(session.negotiate(&syn()), Err(Error::HandshakeTimeout(_)));
        assert_eq!(State::AwaitingSynAck, session.state());
        assert_eq!(1, host.links_opened());
        assert_eq!(0, host.links_released());

        session.close();
        assert_eq!(1, host.links_released());
    }

    #[test]
    fn test_negotiate_reply_without_syn_ack() {
        let host = host();
        host.add_peer(peer().with_tcp_reply(Flags::Ack, 5000));

        let mut session = TcpSession::with_config(&host, "en0", 49152, config());
        let segment = session.negotiate(&syn()).unwrap();
        assert_eq!(Flags::SynAck, segment.flags);
        assert_eq!(1001, segment.seq_num);
        assert_eq!(5001, segment.ack_num);
        assert_eq!(State::Established, session.state());
    }

    #[test]
    fn test_negotiate_reuses_link_and_peer() {
        let host = host();
        host.add_peer(peer().with_syn_ack(2000));

        let mut session = TcpSession::with_config(&host, "en0", 49152, config());
        let segment = session.negotiate(&syn()).unwrap();
        let segment = session.negotiate(&segment.with_flags(Flags::FinAck)).unwrap();

        assert_eq!(Flags::FinAck, segment.flags);
        assert_eq!(1001, segment.seq_num);
        assert_eq!(2001, segment.ack_num);
        assert_eq!(State::Closing, session.state());
        assert_eq!(1, host.links_opened());

        // ARP request, SYN, ACK and FIN+ACK.
        let sent_frames = host.sent_frames();
        assert_eq!(4, sent_frames.len());
        assert_matches!(decode(&sent_frames[0]), Ok(Layer::Arp(_)));
        match decode(&sent_frames[3]) {
            Ok(Layer::Tcp(_, tcp_repr, _)) => {
                assert_eq!(TcpControl::FIN | TcpControl::ACK, tcp_repr.control);
                assert_eq!(1001, tcp_repr.seq_num);
                assert_eq!(2001, tcp_repr.ack_num);
            }
            layer => panic!("Unexpected {:?}.", layer),
        }
    }

    #[test]
    fn test_fin_before_handshake_stays_idle() {
        let host = host();
        host.add_peer(peer());

        let mut session = TcpSession::with_config(&host, "en0", 49152, config());
        let fin_ack = syn().with_flags(Flags::FinAck);
        let segment = session.negotiate(&fin_ack).unwrap();

        assert_eq!(Flags::FinAck, segment.flags);
        assert_eq!(1000, segment.seq_num);
        assert_eq!(0, segment.ack_num);
        assert_eq!(State::Idle, session.state());

        // ARP request and the FIN+ACK itself.
        assert_eq!(2, host.sent_frames().len());
    }

    #[test]
    fn test_seq_num_wraps() {
        let host = host();
        host.add_peer(peer().with_syn_ack(u32::max_value()));

        let mut session = TcpSession::with_config(&host, "en0", 49152, config());
        let syn = Segment {
            seq_num: u32::max_value(),
            ..syn()
        };

        let segment = session.negotiate(&syn).unwrap();
        assert_eq!(0, segment.seq_num);
        assert_eq!(0, segment.ack_num);
    }
}
