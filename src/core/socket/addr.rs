use std::fmt::{
    Display,
    Formatter,
    Result as FmtResult,
};

use core::repr::Ipv4Address;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
/// An IPv4 + port socket address.
pub struct SocketAddr {
    pub addr: Ipv4Address,
    pub port: u16,
}

impl Display for SocketAddr {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}:{}", self.addr, self.port)
    }
}
