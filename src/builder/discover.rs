//! DHCPDISCOVER frame construction.
//!
//! Builds the full Ethernet/IPv4/UDP/DHCP byte sequence for a DISCOVER
//! broadcast. The DHCP payload is encoded first; the headers are then
//! written over one pre-sized buffer and a finishing pass fills in the
//! derived lengths and checksums, so both always match the final bytes.

use std::net::Ipv4Addr;

use macaddr::MacAddr6;
use pnet::packet::ethernet::{EtherTypes, MutableEthernetPacket};
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::packet::ipv4::{self, MutableIpv4Packet};
use pnet::packet::udp::{self, MutableUdpPacket};
use pnet::util::MacAddr;

use crate::domain::{DhcpMessage, DhcpMessageType, DhcpOption, Operation, HARDWARE_TYPE_ETHERNET};
use crate::error::BuildError;

const DHCP_SERVER_PORT: u16 = 67;
const DHCP_CLIENT_PORT: u16 = 68;

const ETHERNET_HEADER_LEN: usize = 14;
const IPV4_HEADER_LEN: usize = 20;
const UDP_HEADER_LEN: usize = 8;

const IP_TTL: u8 = 64;

/// Builder for a DHCPDISCOVER broadcast frame.
///
/// The transaction id is freshly randomized per build unless pinned with
/// [`with_xid`](Self::with_xid).
pub struct DiscoverBuilder {
    hardware_addr: MacAddr6,
    hostname: Option<String>,
    xid: Option<u32>,
}

impl DiscoverBuilder {
    pub fn new(hardware_addr: MacAddr6) -> Self {
        Self {
            hardware_addr,
            hostname: None,
            xid: None,
        }
    }

    /// Include a Hostname option. Empty names are ignored.
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    /// Pin the transaction id instead of randomizing it.
    pub fn with_xid(mut self, xid: u32) -> Self {
        self.xid = Some(xid);
        self
    }

    /// The structured DHCP message this builder serializes.
    pub fn message(&self) -> DhcpMessage {
        let mut options = vec![
            DhcpOption::MessageType(DhcpMessageType::Discover),
            DhcpOption::RequestedIp(Ipv4Addr::UNSPECIFIED),
            DhcpOption::ClientId(client_id(self.hardware_addr)),
        ];

        if let Some(name) = self.hostname.as_deref().filter(|name| !name.is_empty()) {
            options.push(DhcpOption::Hostname(name.to_string()));
        }

        options.push(DhcpOption::End);

        DhcpMessage {
            operation: Operation::Request,
            hardware_type: HARDWARE_TYPE_ETHERNET,
            hops: 0,
            xid: self.xid.unwrap_or_else(rand::random),
            secs: 0,
            flags: 0,
            ciaddr: None,
            yiaddr: None,
            siaddr: None,
            giaddr: None,
            chaddr: self.hardware_addr,
            sname: None,
            file: None,
            options,
        }
    }

    /// Build the complete broadcast frame, ready to transmit.
    pub fn build(&self) -> Result<Vec<u8>, BuildError> {
        let payload = self.message().encode()?;
        assemble_frame(self.hardware_addr, &payload)
    }
}

/// Client Identifier payload: hardware-type tag followed by the address.
fn client_id(addr: MacAddr6) -> Vec<u8> {
    let mut id = Vec::with_capacity(7);
    id.push(HARDWARE_TYPE_ETHERNET);
    id.extend_from_slice(addr.as_bytes());
    id
}

/// Wrap the DHCP payload in UDP, IPv4, and Ethernet headers.
fn assemble_frame(source: MacAddr6, payload: &[u8]) -> Result<Vec<u8>, BuildError> {
    let ip_len = IPV4_HEADER_LEN + UDP_HEADER_LEN + payload.len();
    let total_len = ETHERNET_HEADER_LEN + ip_len;
    let ip_total_length = u16::try_from(ip_len).map_err(|_| BuildError::FrameTooLarge(total_len))?;
    let udp_length = (UDP_HEADER_LEN + payload.len()) as u16;

    let mut frame = vec![0u8; total_len];

    {
        let mut ethernet =
            MutableEthernetPacket::new(&mut frame).ok_or(BuildError::FrameAssembly("ethernet"))?;
        ethernet.set_destination(MacAddr::broadcast());
        ethernet.set_source(mac_addr(source));
        ethernet.set_ethertype(EtherTypes::Ipv4);
    }

    {
        let mut ipv4 = MutableIpv4Packet::new(&mut frame[ETHERNET_HEADER_LEN..])
            .ok_or(BuildError::FrameAssembly("ipv4"))?;
        ipv4.set_version(4);
        ipv4.set_header_length(5); // words, no IP options
        ipv4.set_total_length(ip_total_length);
        ipv4.set_ttl(IP_TTL);
        ipv4.set_next_level_protocol(IpNextHeaderProtocols::Udp);
        ipv4.set_source(Ipv4Addr::UNSPECIFIED);
        ipv4.set_destination(Ipv4Addr::BROADCAST);

        let checksum = ipv4::checksum(&ipv4.to_immutable());
        ipv4.set_checksum(checksum);
    }

    {
        let mut udp = MutableUdpPacket::new(&mut frame[ETHERNET_HEADER_LEN + IPV4_HEADER_LEN..])
            .ok_or(BuildError::FrameAssembly("udp"))?;
        udp.set_source(DHCP_CLIENT_PORT);
        udp.set_destination(DHCP_SERVER_PORT);
        udp.set_length(udp_length);
        udp.set_payload(payload);

        let checksum = udp::ipv4_checksum(
            &udp.to_immutable(),
            &Ipv4Addr::UNSPECIFIED,
            &Ipv4Addr::BROADCAST,
        );
        // 0 means "no checksum" on the wire
        udp.set_checksum(if checksum == 0 { 0xFFFF } else { checksum });
    }

    Ok(frame)
}

fn mac_addr(addr: MacAddr6) -> MacAddr {
    let octets = addr.into_array();
    MacAddr::new(
        octets[0], octets[1], octets[2], octets[3], octets[4], octets[5],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::decode_frame;
    use pnet::packet::ethernet::EthernetPacket;
    use pnet::packet::ipv4::Ipv4Packet;
    use pnet::packet::udp::UdpPacket;
    use pnet::packet::Packet;

    fn probe_mac() -> MacAddr6 {
        MacAddr6::new(0xde, 0xad, 0xbe, 0xef, 0x00, 0x01)
    }

    fn probe_frame() -> Vec<u8> {
        DiscoverBuilder::new(probe_mac())
            .with_hostname("probe1")
            .with_xid(0x11223344)
            .build()
            .unwrap()
    }

    // RFC 1071 ones-complement sum without the final negation; a buffer
    // that includes a valid checksum folds to 0xFFFF
    fn ones_complement_sum(data: &[u8]) -> u16 {
        let mut sum = 0u32;
        let mut chunks = data.chunks_exact(2);
        for chunk in &mut chunks {
            sum += u32::from(u16::from_be_bytes([chunk[0], chunk[1]]));
        }
        if let [byte] = chunks.remainder() {
            sum += u32::from(*byte) << 8;
        }
        while sum > 0xFFFF {
            sum = (sum & 0xFFFF) + (sum >> 16);
        }
        sum as u16
    }

    mod frame_tests {
        use super::*;

        #[test]
        fn builds_broadcast_headers() {
            let frame = probe_frame();

            let ethernet = EthernetPacket::new(&frame).unwrap();
            assert_eq!(ethernet.get_destination(), MacAddr::broadcast());
            assert_eq!(
                ethernet.get_source(),
                MacAddr::new(0xde, 0xad, 0xbe, 0xef, 0x00, 0x01)
            );
            assert_eq!(ethernet.get_ethertype(), EtherTypes::Ipv4);

            let ipv4 = Ipv4Packet::new(ethernet.payload()).unwrap();
            assert_eq!(ipv4.get_version(), 4);
            assert_eq!(ipv4.get_header_length(), 5);
            assert_eq!(ipv4.get_ttl(), IP_TTL);
            assert_eq!(ipv4.get_next_level_protocol(), IpNextHeaderProtocols::Udp);
            assert_eq!(ipv4.get_source(), Ipv4Addr::UNSPECIFIED);
            assert_eq!(ipv4.get_destination(), Ipv4Addr::BROADCAST);

            let udp = UdpPacket::new(ipv4.payload()).unwrap();
            assert_eq!(udp.get_source(), DHCP_CLIENT_PORT);
            assert_eq!(udp.get_destination(), DHCP_SERVER_PORT);
        }

        #[test]
        fn derived_lengths_match_final_sizes() {
            let frame = probe_frame();

            let ipv4 = Ipv4Packet::new(&frame[ETHERNET_HEADER_LEN..]).unwrap();
            assert_eq!(
                ipv4.get_total_length() as usize,
                frame.len() - ETHERNET_HEADER_LEN
            );

            let udp = UdpPacket::new(&frame[ETHERNET_HEADER_LEN + IPV4_HEADER_LEN..]).unwrap();
            assert_eq!(
                udp.get_length() as usize,
                frame.len() - ETHERNET_HEADER_LEN - IPV4_HEADER_LEN
            );
        }

        #[test]
        fn fixed_xid_builds_identical_frames() {
            assert_eq!(probe_frame(), probe_frame());
        }
    }

    mod checksum_tests {
        use super::*;

        #[test]
        fn ipv4_header_folds_to_zero_residual() {
            let frame = probe_frame();
            let header = &frame[ETHERNET_HEADER_LEN..ETHERNET_HEADER_LEN + IPV4_HEADER_LEN];
            assert_eq!(ones_complement_sum(header), 0xFFFF);
        }

        #[test]
        fn udp_segment_folds_to_zero_residual_with_pseudo_header() {
            let frame = probe_frame();
            let segment = &frame[ETHERNET_HEADER_LEN + IPV4_HEADER_LEN..];

            let mut data = Vec::new();
            data.extend_from_slice(&frame[26..30]); // source address
            data.extend_from_slice(&frame[30..34]); // destination address
            data.push(0);
            data.push(17); // UDP protocol number
            data.extend_from_slice(&(segment.len() as u16).to_be_bytes());
            data.extend_from_slice(segment);

            assert_eq!(ones_complement_sum(&data), 0xFFFF);
        }

        #[test]
        fn stored_checksums_match_independent_recomputation() {
            let frame = probe_frame();

            let ipv4 = Ipv4Packet::new(&frame[ETHERNET_HEADER_LEN..]).unwrap();
            assert_eq!(ipv4::checksum(&ipv4), ipv4.get_checksum());

            let udp = UdpPacket::new(&frame[ETHERNET_HEADER_LEN + IPV4_HEADER_LEN..]).unwrap();
            let recomputed =
                udp::ipv4_checksum(&udp, &Ipv4Addr::UNSPECIFIED, &Ipv4Addr::BROADCAST);
            if recomputed == 0 {
                assert_eq!(udp.get_checksum(), 0xFFFF);
            } else {
                assert_eq!(udp.get_checksum(), recomputed);
            }
        }
    }

    mod round_trip_tests {
        use super::*;

        #[test]
        fn built_frame_decodes_back_to_a_discover() {
            let message = decode_frame(&probe_frame()).unwrap().unwrap();

            assert_eq!(message.operation, Operation::Request);
            assert_eq!(message.hardware_type, HARDWARE_TYPE_ETHERNET);
            assert_eq!(message.chaddr, probe_mac());
            assert_eq!(message.xid, 0x11223344);
            assert_eq!(message.flags, 0);
            assert_eq!(message.ciaddr, None);
            assert_eq!(message.message_type(), Some(DhcpMessageType::Discover));
            assert_eq!(
                message.client_id(),
                Some(&[0x01, 0xde, 0xad, 0xbe, 0xef, 0x00, 0x01][..])
            );
        }

        #[test]
        fn options_survive_in_build_order() {
            let message = decode_frame(&probe_frame()).unwrap().unwrap();
            assert_eq!(
                message.options,
                vec![
                    DhcpOption::MessageType(DhcpMessageType::Discover),
                    DhcpOption::RequestedIp(Ipv4Addr::UNSPECIFIED),
                    DhcpOption::ClientId(vec![0x01, 0xde, 0xad, 0xbe, 0xef, 0x00, 0x01]),
                    DhcpOption::Hostname("probe1".to_string()),
                    DhcpOption::End,
                ]
            );
        }

        #[test]
        fn hostname_is_omitted_when_missing_or_empty() {
            let no_name = DiscoverBuilder::new(probe_mac()).with_xid(1).build().unwrap();
            let message = decode_frame(&no_name).unwrap().unwrap();
            assert!(!message
                .options
                .iter()
                .any(|opt| matches!(opt, DhcpOption::Hostname(_))));

            let empty_name = DiscoverBuilder::new(probe_mac())
                .with_hostname("")
                .with_xid(1)
                .build()
                .unwrap();
            let message = decode_frame(&empty_name).unwrap().unwrap();
            assert!(!message
                .options
                .iter()
                .any(|opt| matches!(opt, DhcpOption::Hostname(_))));
        }

        #[test]
        fn random_xid_still_builds_a_decodable_frame() {
            let frame = DiscoverBuilder::new(probe_mac()).build().unwrap();
            let message = decode_frame(&frame).unwrap().unwrap();
            assert_eq!(message.operation, Operation::Request);
            assert_eq!(message.options.last(), Some(&DhcpOption::End));
        }
    }
}
