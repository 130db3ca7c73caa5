#![allow(dead_code)]

use std::time::Duration;

use rawstack::core::dev::Interface;
use rawstack::core::mock::{
    MockHost,
    Peer,
};
use rawstack::core::repr::{
    EthernetAddress,
    Ipv4Address,
    TcpControl,
    TcpRepr,
};
use rawstack::core::service::{
    tcp,
    udp,
};
use rawstack::core::socket::SocketAddr;
use rawstack::core::Config;

pub static IFR_NAME: &str = "en0";

pub static LOCAL_PORT: u16 = 49152;

pub static PEER_PORT: u16 = 53;

lazy_static! {
    pub static ref LOCAL_IPV4_ADDR: Ipv4Address = Ipv4Address::new([10, 0, 0, 5]);
    pub static ref LOCAL_ETHERNET_ADDR: EthernetAddress = EthernetAddress::new([0xAA; 6]);
    pub static ref PEER_IPV4_ADDR: Ipv4Address = Ipv4Address::new([192, 168, 1, 1]);
    pub static ref PEER_ETHERNET_ADDR: EthernetAddress = EthernetAddress::new([0xBB; 6]);
    pub static ref OTHER_IPV4_ADDR: Ipv4Address = Ipv4Address::new([192, 168, 1, 2]);
    pub static ref OTHER_ETHERNET_ADDR: EthernetAddress = EthernetAddress::new([0xCC; 6]);
    pub static ref WINDOW: Duration = Duration::from_millis(100);
}

pub struct Context {
    pub host: MockHost,
    pub config: Config,
}

/// Runs a function f against a host with an en0 interface at 10.0.0.5 and
/// short receive windows.
pub fn run<F, R>(f: F) -> R
where
    F: FnOnce(&mut Context) -> R,
{
    let _ = env_logger::try_init();

    let host = MockHost::new();
    host.add_interface(local_interface());

    let config = Config {
        arp_timeout: *WINDOW,
        handshake_timeout: *WINDOW,
        ..Config::default()
    };

    f(&mut Context { host, config })
}

pub fn local_interface() -> Interface {
    Interface {
        name: IFR_NAME.to_string(),
        ethernet_addr: *LOCAL_ETHERNET_ADDR,
        ipv4_addr: *LOCAL_IPV4_ADDR,
    }
}

fn other_interface() -> Interface {
    Interface {
        name: "other".to_string(),
        ethernet_addr: *OTHER_ETHERNET_ADDR,
        ipv4_addr: *OTHER_IPV4_ADDR,
    }
}

/// The peer at 192.168.1.1, answering ARP requests only.
pub fn peer() -> Peer {
    Peer::new(*PEER_ETHERNET_ADDR, *PEER_IPV4_ADDR)
}

/// A UDP datagram from a third host to the local interface.
pub fn udp_noise() -> Vec<u8> {
    udp::build_packet(
        &other_interface(),
        *LOCAL_ETHERNET_ADDR,
        PEER_PORT,
        &SocketAddr {
            addr: *LOCAL_IPV4_ADDR,
            port: LOCAL_PORT,
        },
        b"noise",
        64,
    ).unwrap()
}

/// A TCP segment from src_addr:src_port to the local port.
pub fn tcp_segment(src_addr: Ipv4Address, src_port: u16, seq_num: u32) -> Vec<u8> {
    let tcp_repr = TcpRepr {
        src_port,
        dst_port: LOCAL_PORT,
        seq_num,
        ack_num: 1001,
        control: TcpControl::SYN | TcpControl::ACK,
        window_size: 65535,
        urgent_pointer: 0,
    };

    let interface = Interface {
        ipv4_addr: src_addr,
        ..other_interface()
    };

    tcp::build_packet(
        &interface,
        *LOCAL_ETHERNET_ADDR,
        *LOCAL_IPV4_ADDR,
        &tcp_repr,
        &[],
        64,
    ).unwrap()
}

/// Bytes which do not decode as any frame.
pub fn garbage() -> Vec<u8> {
    vec![0xFF; 9]
}
