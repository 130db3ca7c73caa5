//! Communication between endpoints.
//!
//! The `socket` module provides socket addresses and a TCP session which
//! drives a connection handshake and teardown over a raw link.

pub mod addr;
pub mod tcp;

pub use self::addr::SocketAddr;
pub use self::tcp::{
    Flags as TcpFlags,
    PeerHwAddr,
    Segment as TcpSegment,
    State as TcpState,
    TcpSession,
};
