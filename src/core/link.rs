use std::io;
use std::time::{
    Duration,
    Instant,
};

/// A low level interface for sending and receiving Ethernet frames.
pub trait Link {
    /// Sends a frame across a link.
    fn send(&mut self, buffer: &[u8]) -> io::Result<()>;

    /// Waits up to timeout for a frame and writes it to the buffer, returning
    /// the size of the frame or None if nothing arrived in time. Frames larger
    /// than the buffer are truncated.
    fn recv(&mut self, buffer: &mut [u8], timeout: Duration) -> io::Result<Option<usize>>;
}

/// An iterator over frames received on a link until a deadline passes.
pub struct Frames<'a, L: 'a + Link + ?Sized> {
    link: &'a mut L,
    deadline: Instant,
    buffer: Vec<u8>,
}

impl<'a, L: 'a + Link + ?Sized> Frames<'a, L> {
    /// Largest frame returned by the iterator.
    pub const SNAPSHOT_LEN: usize = 65536;

    /// Creates an iterator which yields frames for the duration of timeout.
    pub fn new(link: &'a mut L, timeout: Duration) -> Frames<'a, L> {
        Frames {
            link,
            deadline: Instant::now() + timeout,
            buffer: vec![0; Self::SNAPSHOT_LEN],
        }
    }
}

impl<'a, L: 'a + Link + ?Sized> Iterator for Frames<'a, L> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let now = Instant::now();
            if now >= self.deadline {
                return None;
            }

            match self.link.recv(&mut self.buffer, self.deadline - now) {
                Ok(Some(buffer_len)) => return Some(Ok(self.buffer[.. buffer_len].to_vec())),
                Ok(None) => continue,
                Err(err) => return Some(Err(err)),
            }
        }
    }
}
