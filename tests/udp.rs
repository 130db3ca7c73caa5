extern crate env_logger;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate assert_matches;
extern crate rand;
extern crate rawstack;

mod context;

use rawstack::core::api;
use rawstack::core::repr::{
    decode,
    EthernetFrame,
    Layer,
    UdpPacket,
};
use rawstack::Error;

fn send(context: &mut context::Context, payload: &[u8]) -> rawstack::Result<()> {
    api::send_datagram_with_config(
        &context.host,
        context::IFR_NAME,
        "192.168.1.1",
        context::LOCAL_PORT,
        context::PEER_PORT,
        payload,
        &context.config,
    )
}

#[test]
fn send_datagram() {
    context::run(|context| {
        context.host.add_peer(context::peer());

        send(context, b"Hello UDP!").unwrap();

        // ARP request followed by the datagram.
        let sent_frames = context.host.sent_frames();
        assert_eq!(2, sent_frames.len());

        let eth_frame = EthernetFrame::try_new(&sent_frames[1][..]).unwrap();
        assert_eq!(*context::PEER_ETHERNET_ADDR, eth_frame.dst_addr());
        assert_eq!(*context::LOCAL_ETHERNET_ADDR, eth_frame.src_addr());

        let udp_packet = UdpPacket::try_new(&eth_frame.payload()[20 ..]).unwrap();
        assert_ne!(0, udp_packet.checksum());

        match decode(&sent_frames[1]) {
            Ok(Layer::Udp(ipv4_repr, udp_repr, payload)) => {
                assert_eq!(*context::LOCAL_IPV4_ADDR, ipv4_repr.src_addr);
                assert_eq!(*context::PEER_IPV4_ADDR, ipv4_repr.dst_addr);
                assert_eq!(context::LOCAL_PORT, udp_repr.src_port);
                assert_eq!(context::PEER_PORT, udp_repr.dst_port);
                assert_eq!(18, udp_repr.length);
                assert_eq!(b"Hello UDP!", payload);
            }
            layer => panic!("Unexpected {:?}.", layer),
        }

        assert_eq!(1, context.host.links_opened());
        assert_eq!(1, context.host.links_released());
    });
}

#[test]
fn send_random_datagrams() {
    context::run(|context| {
        context.host.add_peer(context::peer());

        for _ in 0 .. 16 {
            let payload: Vec<u8> = (0 .. 128).map(|_| rand::random::<u8>()).collect();
            send(context, &payload).unwrap();

            let sent_frames = context.host.sent_frames();
            match decode(&sent_frames[sent_frames.len() - 1]) {
                Ok(Layer::Udp(_, _, udp_payload)) => assert_eq!(&payload[..], udp_payload),
                layer => panic!("Unexpected {:?}.", layer),
            }
        }

        assert_eq!(16, context.host.links_released());
    });
}

#[test]
fn send_empty_datagram() {
    context::run(|context| {
        context.host.add_peer(context::peer());

        send(context, &[]).unwrap();

        let sent_frames = context.host.sent_frames();
        assert_matches!(decode(&sent_frames[1]), Ok(Layer::Udp(_, _, payload)) if payload.is_empty());
    });
}

#[test]
fn send_datagram_unresolved() {
    context::run(|context| {
        context.host.add_peer(context::peer().silent());

        assert_matches!(send(context, b"Hello UDP!"), Err(Error::ResolutionTimeout(_)));
        assert_eq!(1, context.host.sent_frames().len());
        assert_eq!(1, context.host.links_released());
    });
}

#[test]
fn send_datagram_too_large() {
    context::run(|context| {
        context.host.add_peer(context::peer());

        assert_matches!(send(context, &[0; 1500]), Err(Error::Serialization));
        assert_eq!(1, context.host.sent_frames().len());
        assert_eq!(1, context.host.links_released());
    });
}

#[test]
fn send_datagram_mtu_boundary() {
    context::run(|context| {
        context.host.add_peer(context::peer());

        send(context, &[0; 1472]).unwrap();
        assert_eq!(1514, context.host.sent_frames()[1].len());

        assert_matches!(send(context, &[0; 1473]), Err(Error::Serialization));
        assert_eq!(3, context.host.sent_frames().len());
    });
}

#[test]
fn send_datagram_invalid_address() {
    context::run(|context| {
        let result = api::send_datagram_with_config(
            &context.host,
            context::IFR_NAME,
            "192.168.1.1.1",
            context::LOCAL_PORT,
            context::PEER_PORT,
            b"Hello UDP!",
            &context.config,
        );

        assert_matches!(result, Err(Error::InvalidAddress(_)));
        assert_eq!(0, context.host.links_opened());
    });
}

#[test]
fn send_datagram_transmit_failure() {
    context::run(|context| {
        context.host.add_peer(context::peer());
        context.host.refuse_send(true);

        assert_matches!(send(context, b"Hello UDP!"), Err(Error::Transmit(_)));
        assert_eq!(1, context.host.links_released());
    });
}
