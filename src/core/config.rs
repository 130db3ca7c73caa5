use std::time::Duration;

/// How long to wait for an ARP reply, in milliseconds.
pub static DEFAULT_ARP_TIMEOUT_MS: u64 = 3000;

/// How long to wait for a SYN+ACK after sending a SYN, in milliseconds.
pub static DEFAULT_HANDSHAKE_TIMEOUT_MS: u64 = 3000;

pub static DEFAULT_INITIAL_SEQ_NUM: u32 = 1000;

pub static DEFAULT_WINDOW_SIZE: u16 = 65535;

pub static DEFAULT_TTL: u8 = 64;

/// Tunables for resolution, transmission and handshakes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Receive window for an ARP reply after the request is sent.
    pub arp_timeout: Duration,
    /// Receive window for a SYN+ACK after a SYN is sent.
    pub handshake_timeout: Duration,
    /// Sequence number carried by the first segment of a TCP session.
    pub initial_seq_num: u32,
    /// Receive window advertised in every TCP segment.
    pub window_size: u16,
    /// Time to live of every IPv4 packet.
    pub ttl: u8,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            arp_timeout: Duration::from_millis(DEFAULT_ARP_TIMEOUT_MS),
            handshake_timeout: Duration::from_millis(DEFAULT_HANDSHAKE_TIMEOUT_MS),
            initial_seq_num: DEFAULT_INITIAL_SEQ_NUM,
            window_size: DEFAULT_WINDOW_SIZE,
            ttl: DEFAULT_TTL,
        }
    }
}
