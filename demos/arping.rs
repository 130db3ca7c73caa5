#[macro_use]
extern crate clap;
extern crate env_logger;
extern crate rawstack;

use std::process;

use rawstack::core::api;
use rawstack::linux::LinuxHost;

/// Resolves the MAC address of an IPv4 address on the local network.
fn main() {
    env_logger::init();

    let matches = clap_app!(arping =>
        (@arg ADDRESS: +required "IPv4 address to resolve")
        (@arg INTERFACE: -i --interface +takes_value default_value("en0") "Network interface to send the ARP request on")
    ).get_matches();

    let addr = matches.value_of("ADDRESS").unwrap_or_default();
    let ifr_name = matches.value_of("INTERFACE").unwrap_or_default();

    match api::resolve_address(&LinuxHost::new(), ifr_name, addr) {
        Ok(ethernet_addr) => println!("IP [{}]: MAC [{}]", addr, ethernet_addr),
        Err(err) => {
            eprintln!("Resolving {} failed: {}.", addr, err);
            process::exit(1);
        }
    }
}
