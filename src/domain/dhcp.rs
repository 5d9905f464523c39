//! DHCP message domain model.
//!
//! These types represent the logical structure of DHCPv4 messages,
//! independent of capture and frame plumbing.

use std::net::Ipv4Addr;

use macaddr::MacAddr6;

use crate::domain::options::{option_codes, DhcpOption};
use crate::error::BuildError;

/// DHCP magic cookie: 0x63825363
pub const DHCP_MAGIC_COOKIE: [u8; 4] = [0x63, 0x82, 0x53, 0x63];

/// Size of the fixed DHCP header, up to the magic cookie.
pub const FIXED_HEADER_LEN: usize = 236;

/// Hardware type code for Ethernet.
pub const HARDWARE_TYPE_ETHERNET: u8 = 1;

/// DHCP operation (BOOTP `op` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Client to server (BOOTREQUEST)
    Request,
    /// Server to client (BOOTREPLY)
    Reply,
}

impl Operation {
    /// Parse from the wire `op` byte.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Request),
            2 => Some(Self::Reply),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::Request => 1,
            Self::Reply => 2,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Request => write!(f, "Request"),
            Self::Reply => write!(f, "Reply"),
        }
    }
}

/// DHCP message types as defined in RFC 2131.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DhcpMessageType {
    Discover,
    Offer,
    Request,
    Decline,
    Ack,
    Nak,
    Release,
    Inform,
}

impl DhcpMessageType {
    /// Parse from the DHCP option 53 value.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Discover),
            2 => Some(Self::Offer),
            3 => Some(Self::Request),
            4 => Some(Self::Decline),
            5 => Some(Self::Ack),
            6 => Some(Self::Nak),
            7 => Some(Self::Release),
            8 => Some(Self::Inform),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::Discover => 1,
            Self::Offer => 2,
            Self::Request => 3,
            Self::Decline => 4,
            Self::Ack => 5,
            Self::Nak => 6,
            Self::Release => 7,
            Self::Inform => 8,
        }
    }
}

impl std::fmt::Display for DhcpMessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Discover => write!(f, "DISCOVER"),
            Self::Offer => write!(f, "OFFER"),
            Self::Request => write!(f, "REQUEST"),
            Self::Decline => write!(f, "DECLINE"),
            Self::Ack => write!(f, "ACK"),
            Self::Nak => write!(f, "NAK"),
            Self::Release => write!(f, "RELEASE"),
            Self::Inform => write!(f, "INFORM"),
        }
    }
}

/// A decoded or to-be-sent DHCPv4 message.
///
/// The four wire address fields use the unspecified address 0.0.0.0 as an
/// "absent" sentinel; here they are `Option` and the zero check happens only
/// when crossing the wire boundary.
#[derive(Debug, Clone)]
pub struct DhcpMessage {
    /// Request or Reply
    pub operation: Operation,
    /// Hardware type (1 = Ethernet)
    pub hardware_type: u8,
    /// Relay hop count
    pub hops: u8,
    /// Transaction ID
    pub xid: u32,
    /// Seconds elapsed since the client started acquiring
    pub secs: u16,
    /// Flags; top bit requests a broadcast reply
    pub flags: u16,
    /// Client IP address (ciaddr, if the client already has one)
    pub ciaddr: Option<Ipv4Addr>,
    /// 'Your' IP address (yiaddr, assigned by the server)
    pub yiaddr: Option<Ipv4Addr>,
    /// Next server IP address (siaddr)
    pub siaddr: Option<Ipv4Addr>,
    /// Relay agent IP address (giaddr)
    pub giaddr: Option<Ipv4Addr>,
    /// Client hardware address
    pub chaddr: MacAddr6,
    /// Server hostname (optional)
    pub sname: Option<String>,
    /// Boot filename (optional)
    pub file: Option<String>,
    /// Options in wire order, normally terminated by End
    pub options: Vec<DhcpOption>,
}

impl DhcpMessage {
    /// Get the DHCP message type from options.
    pub fn message_type(&self) -> Option<DhcpMessageType> {
        self.options.iter().find_map(|opt| {
            if let DhcpOption::MessageType(msg_type) = opt {
                Some(*msg_type)
            } else {
                None
            }
        })
    }

    /// Get the client identifier payload (Option 61).
    pub fn client_id(&self) -> Option<&[u8]> {
        self.options.iter().find_map(|opt| {
            if let DhcpOption::ClientId(ref id) = opt {
                Some(id.as_slice())
            } else {
                None
            }
        })
    }

    /// Serialize to the UDP payload wire form.
    ///
    /// Produces the fixed 236-byte header, the magic cookie, then every
    /// option in order. An End option is appended if the list does not
    /// already carry one.
    pub fn encode(&self) -> Result<Vec<u8>, BuildError> {
        let mut out = vec![0u8; FIXED_HEADER_LEN];

        out[0] = self.operation.as_u8();
        out[1] = self.hardware_type;
        out[2] = 6; // hlen: Ethernet address length
        out[3] = self.hops;
        out[4..8].copy_from_slice(&self.xid.to_be_bytes());
        out[8..10].copy_from_slice(&self.secs.to_be_bytes());
        out[10..12].copy_from_slice(&self.flags.to_be_bytes());
        out[12..16].copy_from_slice(&wire_addr(self.ciaddr));
        out[16..20].copy_from_slice(&wire_addr(self.yiaddr));
        out[20..24].copy_from_slice(&wire_addr(self.siaddr));
        out[24..28].copy_from_slice(&wire_addr(self.giaddr));

        // chaddr occupies 16 bytes; only the first 6 carry the MAC
        out[28..34].copy_from_slice(self.chaddr.as_bytes());

        if let Some(name) = &self.sname {
            let bytes = name.as_bytes();
            let len = bytes.len().min(63); // keep the NUL terminator
            out[44..44 + len].copy_from_slice(&bytes[..len]);
        }

        if let Some(file) = &self.file {
            let bytes = file.as_bytes();
            let len = bytes.len().min(127);
            out[108..108 + len].copy_from_slice(&bytes[..len]);
        }

        out.extend_from_slice(&DHCP_MAGIC_COOKIE);

        for option in &self.options {
            option.encode(&mut out)?;
        }

        if !self
            .options
            .iter()
            .any(|opt| matches!(opt, DhcpOption::End))
        {
            out.push(option_codes::END);
        }

        Ok(out)
    }
}

/// Zero-check boundary: absent addresses go on the wire as 0.0.0.0.
fn wire_addr(addr: Option<Ipv4Addr>) -> [u8; 4] {
    addr.unwrap_or(Ipv4Addr::UNSPECIFIED).octets()
}
