//! In-memory hosts and links for exercising the stack without a network.
//!
//! A `MockHost` hands out `MockLink`s which record every transmitted frame and
//! feed them to scripted `Peer`s. Replies from peers, and any frames injected
//! by a test, are delivered in order to the next receive on a link.

use std::cell::{
    RefCell,
    RefMut,
};
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use core::dev::{
    Host,
    Interface,
};
use core::link::Link;
use core::repr::{
    decode,
    Arp,
    ArpOp,
    EthernetAddress,
    EthernetFrame,
    Ipv4Address,
    Layer,
    TcpControl,
    TcpRepr,
};
use core::service::{
    arp,
    tcp,
};
use core::socket::TcpFlags;
use {
    Error,
    Result,
};

/// Peers zero pad their frames to this length, as a NIC would.
const MIN_FRAME_LEN: usize = EthernetFrame::<&[u8]>::MIN_FRAME_LEN;

#[derive(Debug, Default)]
struct State {
    interfaces: Vec<Interface>,
    peers: Vec<Peer>,
    pending: VecDeque<Vec<u8>>,
    sent: Vec<Vec<u8>>,
    opened: usize,
    released: usize,
    refuse_send: bool,
    refuse_recv: bool,
}

/// A host with scripted interfaces and peers.
#[derive(Clone, Default)]
pub struct MockHost {
    state: Rc<RefCell<State>>,
}

impl MockHost {
    pub fn new() -> MockHost {
        MockHost::default()
    }

    pub fn add_interface(&self, interface: Interface) {
        self.state().interfaces.push(interface);
    }

    /// Adds a peer which answers frames sent on any link of the host.
    pub fn add_peer(&self, peer: Peer) {
        self.state().peers.push(peer);
    }

    /// Queues a frame for the next receive on any link of the host.
    pub fn inject(&self, frame: Vec<u8>) {
        self.state().pending.push_back(frame);
    }

    /// Makes every link of the host fail to send frames.
    pub fn refuse_send(&self, refuse: bool) {
        self.state().refuse_send = refuse;
    }

    /// Makes every link of the host fail to receive frames.
    pub fn refuse_recv(&self, refuse: bool) {
        self.state().refuse_recv = refuse;
    }

    /// Returns every frame sent via links of the host, in order.
    pub fn sent_frames(&self) -> Vec<Vec<u8>> {
        self.state().sent.clone()
    }

    pub fn links_opened(&self) -> usize {
        self.state().opened
    }

    pub fn links_released(&self) -> usize {
        self.state().released
    }

    fn state(&self) -> RefMut<State> {
        self.state.borrow_mut()
    }
}

impl Host for MockHost {
    type Link = MockLink;

    fn lookup(&self, ifr_name: &str) -> Result<Interface> {
        self.state()
            .interfaces
            .iter()
            .find(|interface| interface.name == ifr_name)
            .cloned()
            .ok_or_else(|| Error::InterfaceLookup(ifr_name.to_string()))
    }

    fn open(&self, ifr_name: &str) -> Result<MockLink> {
        self.lookup(ifr_name)?;
        self.state().opened += 1;
        Ok(MockLink {
            state: self.state.clone(),
        })
    }
}

/// A link on a `MockHost`.
#[derive(Debug)]
pub struct MockLink {
    state: Rc<RefCell<State>>,
}

impl Link for MockLink {
    fn send(&mut self, buffer: &[u8]) -> io::Result<()> {
        let mut state = self.state.borrow_mut();

        if state.refuse_send {
            return Err(io::Error::new(io::ErrorKind::Other, "link refused frame"));
        }

        state.sent.push(buffer.to_vec());

        let replies: Vec<_> = state
            .peers
            .iter()
            .flat_map(|peer| peer.respond(buffer))
            .collect();
        state.pending.extend(replies);

        Ok(())
    }

    fn recv(&mut self, buffer: &mut [u8], timeout: Duration) -> io::Result<Option<usize>> {
        let frame = {
            let mut state = self.state.borrow_mut();
            if state.refuse_recv {
                return Err(io::Error::new(io::ErrorKind::Other, "link lost"));
            }
            state.pending.pop_front()
        };

        match frame {
            Some(frame) => {
                let buffer_len = frame.len().min(buffer.len());
                buffer[.. buffer_len].copy_from_slice(&frame[.. buffer_len]);
                Ok(Some(buffer_len))
            }
            None => {
                thread::sleep(timeout);
                Ok(None)
            }
        }
    }
}

impl Drop for MockLink {
    fn drop(&mut self) {
        self.state.borrow_mut().released += 1;
    }
}

/// A simulated remote machine which answers ARP requests for its address
/// and, optionally, TCP SYNs.
#[derive(Clone, Debug)]
pub struct Peer {
    interface: Interface,
    answers_arp: bool,
    tcp_reply: Option<(TcpFlags, u32)>,
}

impl Peer {
    pub fn new(ethernet_addr: EthernetAddress, ipv4_addr: Ipv4Address) -> Peer {
        Peer {
            interface: Interface {
                name: "peer".to_string(),
                ethernet_addr,
                ipv4_addr,
            },
            answers_arp: true,
            tcp_reply: None,
        }
    }

    /// Makes the peer ignore ARP requests.
    pub fn silent(self) -> Peer {
        Peer {
            answers_arp: false,
            ..self
        }
    }

    /// Makes the peer answer a SYN with a SYN+ACK carrying seq_num.
    pub fn with_syn_ack(self, seq_num: u32) -> Peer {
        self.with_tcp_reply(TcpFlags::SynAck, seq_num)
    }

    /// Makes the peer answer a SYN with a segment carrying flags and seq_num.
    pub fn with_tcp_reply(self, flags: TcpFlags, seq_num: u32) -> Peer {
        Peer {
            tcp_reply: Some((flags, seq_num)),
            ..self
        }
    }

    /// Returns the frames the peer sends in response to a frame.
    pub fn respond(&self, eth_buffer: &[u8]) -> Vec<Vec<u8>> {
        let src_hw_addr = match EthernetFrame::try_new(eth_buffer) {
            Ok(eth_frame) => eth_frame.src_addr(),
            Err(_) => return vec![],
        };

        let reply = match decode(eth_buffer) {
            Ok(Layer::Arp(arp_repr)) => self.respond_arp(&arp_repr),
            Ok(Layer::Tcp(ipv4_repr, tcp_repr, _)) if ipv4_repr.dst_addr == self.interface.ipv4_addr => {
                self.respond_tcp(src_hw_addr, ipv4_repr.src_addr, &tcp_repr)
            }
            _ => None,
        };

        reply
            .into_iter()
            .map(|mut frame| {
                if frame.len() < MIN_FRAME_LEN {
                    frame.resize(MIN_FRAME_LEN, 0);
                }
                frame
            })
            .collect()
    }

    fn respond_arp(&self, arp_repr: &Arp) -> Option<Vec<u8>> {
        if !self.answers_arp
            || arp_repr.op != ArpOp::Request
            || arp_repr.target_proto_addr != self.interface.ipv4_addr
        {
            return None;
        }

        let arp_reply = Arp {
            op: ArpOp::Reply,
            source_hw_addr: self.interface.ethernet_addr,
            source_proto_addr: self.interface.ipv4_addr,
            target_hw_addr: arp_repr.source_hw_addr,
            target_proto_addr: arp_repr.source_proto_addr,
        };

        arp::build_packet(&self.interface, &arp_reply, arp_repr.source_hw_addr).ok()
    }

    fn respond_tcp(
        &self,
        dst_hw_addr: EthernetAddress,
        dst_addr: Ipv4Address,
        tcp_repr: &TcpRepr,
    ) -> Option<Vec<u8>> {
        if tcp_repr.control != TcpControl::SYN {
            return None;
        }

        let (flags, seq_num) = self.tcp_reply?;
        let tcp_reply = TcpRepr {
            src_port: tcp_repr.dst_port,
            dst_port: tcp_repr.src_port,
            seq_num,
            ack_num: tcp_repr.seq_num.wrapping_add(1),
            control: flags.control(),
            window_size: 65535,
            urgent_pointer: 0,
        };

        tcp::build_packet(&self.interface, dst_hw_addr, dst_addr, &tcp_reply, &[], 64).ok()
    }
}
