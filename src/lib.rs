#[cfg(test)]
#[macro_use]
extern crate assert_matches;
extern crate byteorder;
extern crate get_if_addrs;
extern crate libc;
#[macro_use]
extern crate log;

pub mod core;

#[cfg(target_os = "linux")]
pub mod linux;

use std::fmt::{
    Display,
    Formatter,
    Result as FmtResult,
};

use core::repr::Ipv4Address;
use core::socket::SocketAddr;

#[derive(Debug)]
pub enum Error {
    /// Indicates an interface that does not exist or has no IPv4 address.
    InterfaceLookup(String),
    /// Indicates a malformed IPv4 or hardware address literal.
    InvalidAddress(String),
    /// Indicates no ARP reply was received for an address in time.
    ResolutionTimeout(Ipv4Address),
    /// Indicates a frame could not be constructed, usually because it does
    /// not fit in a buffer.
    Serialization,
    /// Indicates the link refused to transmit a frame.
    Transmit(std::io::Error),
    /// Indicates no matching TCP segment arrived from a peer in time.
    HandshakeTimeout(SocketAddr),
    /// Indicates an operation on a session whose link has been closed.
    Closed,
    /// Indicates a buffer is too small for the packet or frame it holds.
    Exhausted,
    /// Indicates a packet or frame is malformed.
    Malformed,
    /// Indicates a checksum is invalid.
    Checksum,
    /// Indicates the link failed while receiving a frame, or another
    /// generic IO error.
    IO(std::io::Error),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IO(err)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match *self {
            Error::InterfaceLookup(ref ifr_name) => {
                write!(f, "no usable interface named '{}'", ifr_name)
            }
            Error::InvalidAddress(ref addr) => write!(f, "invalid address '{}'", addr),
            Error::ResolutionTimeout(addr) => write!(f, "no ARP reply from {}", addr),
            Error::Serialization => write!(f, "frame does not fit its buffer"),
            Error::Transmit(ref err) => write!(f, "transmit failed: {}", err),
            Error::HandshakeTimeout(addr) => write!(f, "no TCP reply from {}", addr),
            Error::Closed => write!(f, "link closed"),
            Error::Exhausted => write!(f, "buffer exhausted"),
            Error::Malformed => write!(f, "malformed packet"),
            Error::Checksum => write!(f, "invalid checksum"),
            Error::IO(ref err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
