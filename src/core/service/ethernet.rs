use core::dev::Interface;
use core::link::Link;
use core::repr::{
    EthernetAddress,
    EthernetFrame,
    EthernetRepr,
};
use {
    Error,
    Result,
};

/// Builds an Ethernet frame sourced from an interface.
///
/// The frame is sized to fit exactly payload_len bytes of payload, which the
/// caller writes via f. Fails with `Error::Serialization` if the frame would
/// exceed the maximum Ethernet frame size or f fails to write the payload.
pub fn build_frame<F>(
    interface: &Interface,
    dst_addr: EthernetAddress,
    payload_type: u16,
    payload_len: usize,
    f: F,
) -> Result<Vec<u8>>
where
    F: FnOnce(&mut [u8]) -> Result<()>,
{
    let eth_repr = EthernetRepr {
        dst_addr,
        src_addr: interface.ethernet_addr,
        payload_type,
    };

    let mut eth_buffer = vec![0; EthernetFrame::<&[u8]>::buffer_len(payload_len)];

    {
        let mut eth_frame =
            EthernetFrame::try_new(&mut eth_buffer[..]).map_err(|_| Error::Serialization)?;
        eth_repr.serialize(&mut eth_frame);
        f(eth_frame.payload_mut()).map_err(|_| Error::Serialization)?;
    }

    Ok(eth_buffer)
}

/// Sends an Ethernet frame via a link.
pub fn send_frame<L>(link: &mut L, eth_buffer: &[u8]) -> Result<()>
where
    L: Link + ?Sized,
{
    debug!("Sending {} byte Ethernet frame.", eth_buffer.len());
    link.send(eth_buffer).map_err(Error::Transmit)
}
