//! Linux implementations of hosts and links.

pub mod host;
pub mod link;
mod libc;

pub use self::host::LinuxHost;
pub use self::link::PacketSocket;
