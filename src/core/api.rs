//! Operations for callers holding an interface name and a text address.
//!
//! Each operation looks up the interface afresh and uses its own link, which
//! is released before the operation returns.

use core::config::Config;
use core::dev::Host;
use core::repr::{
    EthernetAddress,
    Ipv4Address,
};
use core::service::{
    arp,
    udp,
};
use core::socket::{
    SocketAddr,
    TcpSession,
};
use Result;

/// Resolves the hardware address of an IPv4 address via ARP on an interface.
pub fn resolve_address<H: Host>(host: &H, ifr_name: &str, target: &str) -> Result<EthernetAddress> {
    resolve_address_with_config(host, ifr_name, target, &Config::default())
}

pub fn resolve_address_with_config<H: Host>(
    host: &H,
    ifr_name: &str,
    target: &str,
    config: &Config,
) -> Result<EthernetAddress> {
    let ipv4_addr = target.parse::<Ipv4Address>()?;
    let interface = host.lookup(ifr_name)?;
    let mut link = host.open(ifr_name)?;

    let ethernet_addr = arp::resolve(&mut link, &interface, ipv4_addr, config.arp_timeout)?;
    info!("Resolved {} to {}.", ipv4_addr, ethernet_addr);
    Ok(ethernet_addr)
}

/// Sends a single UDP datagram to target:dst_port from src_port on an
/// interface. Nothing is awaited after transmission.
pub fn send_datagram<H: Host>(
    host: &H,
    ifr_name: &str,
    target: &str,
    src_port: u16,
    dst_port: u16,
    payload: &[u8],
) -> Result<()> {
    send_datagram_with_config(
        host,
        ifr_name,
        target,
        src_port,
        dst_port,
        payload,
        &Config::default(),
    )
}

pub fn send_datagram_with_config<H: Host>(
    host: &H,
    ifr_name: &str,
    target: &str,
    src_port: u16,
    dst_port: u16,
    payload: &[u8],
    config: &Config,
) -> Result<()> {
    let dst_socket_addr = SocketAddr {
        addr: target.parse::<Ipv4Address>()?,
        port: dst_port,
    };
    let interface = host.lookup(ifr_name)?;
    let mut link = host.open(ifr_name)?;

    let dst_hw_addr = arp::resolve(
        &mut link,
        &interface,
        dst_socket_addr.addr,
        config.arp_timeout,
    )?;

    udp::send_packet(
        &mut link,
        &interface,
        dst_hw_addr,
        src_port,
        &dst_socket_addr,
        payload,
        config.ttl,
    )
}

/// Creates a TCP session on an interface. No network access happens until
/// the session negotiates its first segment.
pub fn open_connection<H: Host>(host: H, ifr_name: &str, src_port: u16) -> TcpSession<H> {
    TcpSession::open(host, ifr_name, src_port)
}

pub fn open_connection_with_config<H: Host>(
    host: H,
    ifr_name: &str,
    src_port: u16,
    config: Config,
) -> TcpSession<H> {
    TcpSession::with_config(host, ifr_name, src_port, config)
}
