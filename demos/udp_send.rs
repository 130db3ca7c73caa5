#[macro_use]
extern crate clap;
extern crate env_logger;
extern crate rawstack;

use std::process;

use rawstack::core::api;
use rawstack::linux::LinuxHost;

/// Sends a single UDP datagram carrying a text message.
fn main() {
    env_logger::init();

    let matches = clap_app!(udp_send =>
        (@arg ADDRESS: default_value("192.168.1.1") "IPv4 address to send the datagram to")
        (@arg MESSAGE: default_value("Hello UDP!") "Text to send")
        (@arg INTERFACE: -i --interface +takes_value default_value("en0") "Network interface to send on")
        (@arg SRC_PORT: -s --sport +takes_value default_value("49152") "Source UDP port")
        (@arg DST_PORT: -d --dport +takes_value default_value("53") "Destination UDP port")
    ).get_matches();

    let addr = matches.value_of("ADDRESS").unwrap_or_default();
    let message = matches.value_of("MESSAGE").unwrap_or_default();
    let ifr_name = matches.value_of("INTERFACE").unwrap_or_default();

    let (src_port, dst_port) = match (
        value_t!(matches, "SRC_PORT", u16),
        value_t!(matches, "DST_PORT", u16),
    ) {
        (Ok(src_port), Ok(dst_port)) => (src_port, dst_port),
        (Err(err), _) | (_, Err(err)) => err.exit(),
    };

    let host = LinuxHost::new();
    if let Err(err) = api::send_datagram(&host, ifr_name, addr, src_port, dst_port, message.as_bytes()) {
        eprintln!("Sending to {}:{} failed: {}.", addr, dst_port, err);
        process::exit(1);
    }

    println!(
        "Sent {} bytes from port {} to {}:{}.",
        message.len(),
        src_port,
        addr,
        dst_port
    );
}
