//! Link-layer frame decoding.
//!
//! Walks a raw Ethernet frame down to the UDP payload and hands DHCP-port
//! traffic to the payload parser. Purely functional over the input bytes.

use pnet::packet::ethernet::{EtherTypes, EthernetPacket};
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::packet::ipv4::Ipv4Packet;
use pnet::packet::udp::UdpPacket;
use pnet::packet::Packet;

use crate::domain::DhcpMessage;
use crate::error::DecodeError;
use crate::parser::parse_message;

/// DHCP server port
pub const DHCP_SERVER_PORT: u16 = 67;
/// DHCP client port
pub const DHCP_CLIENT_PORT: u16 = 68;

/// Decode a raw link-layer frame into a DHCP message.
///
/// Anything that is not Ethernet → IPv4 → UDP on the DHCP ports carrying a
/// DHCP payload returns `Ok(None)`; only a DHCP-shaped payload with a broken
/// options region is an error.
pub fn decode_frame(data: &[u8]) -> Result<Option<DhcpMessage>, DecodeError> {
    let ethernet = match EthernetPacket::new(data) {
        Some(packet) => packet,
        None => return Ok(None),
    };

    if ethernet.get_ethertype() != EtherTypes::Ipv4 {
        return Ok(None);
    }

    let ipv4 = match Ipv4Packet::new(ethernet.payload()) {
        Some(packet) => packet,
        None => return Ok(None),
    };

    if ipv4.get_next_level_protocol() != IpNextHeaderProtocols::Udp {
        return Ok(None);
    }

    let udp = match UdpPacket::new(ipv4.payload()) {
        Some(packet) => packet,
        None => return Ok(None),
    };

    if !is_dhcp_port(udp.get_source()) && !is_dhcp_port(udp.get_destination()) {
        return Ok(None);
    }

    parse_message(udp.payload())
}

fn is_dhcp_port(port: u16) -> bool {
    port == DHCP_SERVER_PORT || port == DHCP_CLIENT_PORT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::options::option_codes;
    use crate::domain::{Operation, DHCP_MAGIC_COOKIE, FIXED_HEADER_LEN};

    const ETHERNET_HEADER_LEN: usize = 14;
    const IPV4_HEADER_LEN: usize = 20;
    const UDP_HEADER_LEN: usize = 8;

    fn dhcp_payload(op: u8) -> Vec<u8> {
        let mut payload = vec![0u8; FIXED_HEADER_LEN + 4];
        payload[0] = op;
        payload[1] = 1;
        payload[2] = 6;
        payload[4..8].copy_from_slice(&0xdeadbeefu32.to_be_bytes());
        payload[28..34].copy_from_slice(&[0xde, 0xad, 0xbe, 0xef, 0x00, 0x01]);
        payload[FIXED_HEADER_LEN..].copy_from_slice(&DHCP_MAGIC_COOKIE);
        payload.extend_from_slice(&[option_codes::MESSAGE_TYPE, 1, 1, option_codes::END]);
        payload
    }

    // Hand-built Ethernet + IPv4 + UDP frame; checksums are irrelevant to decoding
    fn build_frame(ethertype: [u8; 2], protocol: u8, src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<u8> {
        let mut frame = vec![0u8; ETHERNET_HEADER_LEN + IPV4_HEADER_LEN + UDP_HEADER_LEN];
        frame[0..6].copy_from_slice(&[0xff; 6]);
        frame[6..12].copy_from_slice(&[0xde, 0xad, 0xbe, 0xef, 0x00, 0x01]);
        frame[12..14].copy_from_slice(&ethertype);

        let ip_len = (IPV4_HEADER_LEN + UDP_HEADER_LEN + payload.len()) as u16;
        frame[14] = 0x45; // version 4, ihl 5
        frame[16..18].copy_from_slice(&ip_len.to_be_bytes());
        frame[22] = 64; // ttl
        frame[23] = protocol;
        frame[30..34].copy_from_slice(&[255, 255, 255, 255]);

        let udp_len = (UDP_HEADER_LEN + payload.len()) as u16;
        frame[34..36].copy_from_slice(&src_port.to_be_bytes());
        frame[36..38].copy_from_slice(&dst_port.to_be_bytes());
        frame[38..40].copy_from_slice(&udp_len.to_be_bytes());

        frame.extend_from_slice(payload);
        frame
    }

    #[test]
    fn decodes_dhcp_request_frame() {
        let frame = build_frame([0x08, 0x00], 17, 68, 67, &dhcp_payload(1));
        let message = decode_frame(&frame).unwrap().unwrap();
        assert_eq!(message.operation, Operation::Request);
        assert_eq!(message.xid, 0xdeadbeef);
    }

    #[test]
    fn decodes_dhcp_reply_frame() {
        let frame = build_frame([0x08, 0x00], 17, 67, 68, &dhcp_payload(2));
        let message = decode_frame(&frame).unwrap().unwrap();
        assert_eq!(message.operation, Operation::Reply);
    }

    #[test]
    fn empty_and_truncated_frames_are_absent() {
        assert!(decode_frame(&[]).unwrap().is_none());
        assert!(decode_frame(&[0u8; 10]).unwrap().is_none());
    }

    #[test]
    fn non_ipv4_ethertype_is_absent() {
        // ARP
        let frame = build_frame([0x08, 0x06], 17, 68, 67, &dhcp_payload(1));
        assert!(decode_frame(&frame).unwrap().is_none());
    }

    #[test]
    fn non_udp_protocol_is_absent() {
        // TCP
        let frame = build_frame([0x08, 0x00], 6, 68, 67, &dhcp_payload(1));
        assert!(decode_frame(&frame).unwrap().is_none());
    }

    #[test]
    fn non_dhcp_ports_are_absent() {
        let frame = build_frame([0x08, 0x00], 17, 5353, 5353, &dhcp_payload(1));
        assert!(decode_frame(&frame).unwrap().is_none());
    }

    #[test]
    fn short_udp_payload_on_dhcp_ports_is_absent() {
        let frame = build_frame([0x08, 0x00], 17, 68, 67, &[0u8; 60]);
        assert!(decode_frame(&frame).unwrap().is_none());
    }

    #[test]
    fn malformed_options_are_an_error_not_absent() {
        let mut payload = dhcp_payload(1);
        payload.truncate(FIXED_HEADER_LEN + 4);
        payload.extend_from_slice(&[option_codes::HOSTNAME, 40, b'x']);
        let frame = build_frame([0x08, 0x00], 17, 68, 67, &payload);
        assert!(decode_frame(&frame).is_err());
    }
}
