//! Packet processing services for different network layers.
//!
//! The `service` module builds complete frames for each layer of the network
//! stack and exchanges them with a peer over a link.

pub mod arp;
pub mod ethernet;
pub mod ipv4;
pub mod tcp;
pub mod udp;
