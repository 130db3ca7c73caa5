#[macro_use]
extern crate clap;
extern crate env_logger;
#[macro_use]
extern crate lazy_static;
extern crate rawstack;

use std::process;
use std::thread;
use std::time::Duration;

use rawstack::core::api;
use rawstack::core::repr::Ipv4Address;
use rawstack::core::socket::{
    TcpFlags,
    TcpSegment,
};
use rawstack::linux::LinuxHost;

lazy_static! {
    static ref PAUSE: Duration = Duration::from_secs(1);
}

/// Opens a TCP connection with a three way handshake, then closes it with a
/// FIN+ACK.
///
/// The kernel knows nothing about the connection and may answer the SYN+ACK
/// with a RST. Use tcpdump or tshark to observe the exchange.
fn main() {
    env_logger::init();

    let matches = clap_app!(tcp_handshake =>
        (@arg ADDRESS: default_value("192.168.1.1") "IPv4 address to connect to")
        (@arg INTERFACE: -i --interface +takes_value default_value("en0") "Network interface to connect on")
        (@arg SRC_PORT: -s --sport +takes_value default_value("49152") "Source TCP port")
        (@arg DST_PORT: -d --dport +takes_value default_value("49152") "Destination TCP port")
    ).get_matches();

    let ifr_name = matches.value_of("INTERFACE").unwrap_or_default();

    let (addr, src_port, dst_port) = match (
        value_t!(matches, "ADDRESS", Ipv4Address),
        value_t!(matches, "SRC_PORT", u16),
        value_t!(matches, "DST_PORT", u16),
    ) {
        (Ok(addr), Ok(src_port), Ok(dst_port)) => (addr, src_port, dst_port),
        (Err(err), _, _) | (_, Err(err), _) | (_, _, Err(err)) => err.exit(),
    };

    let mut session = api::open_connection(LinuxHost::new(), ifr_name, src_port);

    let syn = TcpSegment::new(addr, dst_port, TcpFlags::Syn, session.seq_num(), session.ack_num());
    let established = match session.negotiate(&syn) {
        Ok(segment) => segment,
        Err(err) => {
            eprintln!("Handshake with {}:{} failed: {}.", addr, dst_port, err);
            session.close();
            process::exit(1);
        }
    };

    println!(
        "Connected to {}:{} with seq = {}, ack = {}.",
        addr, dst_port, established.seq_num, established.ack_num
    );

    thread::sleep(*PAUSE);

    match session.negotiate(&established.with_flags(TcpFlags::FinAck)) {
        Ok(segment) => println!(
            "Sent FIN+ACK with seq = {}, ack = {}.",
            segment.seq_num, segment.ack_num
        ),
        Err(err) => eprintln!("Closing {}:{} failed: {}.", addr, dst_port, err),
    }

    session.close();
}
