//! DHCP option model.
//!
//! Options are a tagged sequence on the wire: code, length, payload. Known
//! codes decode into typed variants; everything else is kept as `Raw` so a
//! captured packet round-trips losslessly no matter what it carries.

use std::fmt;
use std::net::Ipv4Addr;

use crate::domain::DhcpMessageType;
use crate::error::BuildError;
use crate::utils::format_mac;

/// DHCP option codes (RFC 2132).
pub mod option_codes {
    pub const PAD: u8 = 0;
    pub const SUBNET_MASK: u8 = 1;
    pub const ROUTER: u8 = 3;
    pub const DOMAIN_NAME_SERVER: u8 = 6;
    pub const HOSTNAME: u8 = 12;
    pub const DOMAIN_NAME: u8 = 15;
    pub const REQUESTED_IP: u8 = 50;
    pub const LEASE_TIME: u8 = 51;
    pub const MESSAGE_TYPE: u8 = 53;
    pub const SERVER_ID: u8 = 54;
    pub const VENDOR_CLASS_ID: u8 = 60;
    pub const CLIENT_ID: u8 = 61;
    pub const END: u8 = 255;
}

/// A single DHCP option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DhcpOption {
    /// Option 53: DHCP Message Type
    MessageType(DhcpMessageType),
    /// Option 50: Requested IP Address
    RequestedIp(Ipv4Addr),
    /// Option 54: Server Identifier
    ServerId(Ipv4Addr),
    /// Option 51: IP Address Lease Time (seconds)
    LeaseTime(u32),
    /// Option 1: Subnet Mask
    SubnetMask(Ipv4Addr),
    /// Option 3: Router addresses
    Router(Vec<Ipv4Addr>),
    /// Option 6: Domain Name Server addresses
    DomainNameServer(Vec<Ipv4Addr>),
    /// Option 15: Domain Name
    DomainName(String),
    /// Option 12: Host Name
    Hostname(String),
    /// Option 61: Client Identifier (hardware-type tag + address bytes)
    ClientId(Vec<u8>),
    /// Option 60: Vendor Class Identifier
    VendorClassId(String),
    /// Option 255: end of options
    End,
    /// Any other option, or a known code whose payload has the wrong shape
    Raw(u8, Vec<u8>),
}

impl DhcpOption {
    /// The wire code of this option.
    pub fn code(&self) -> u8 {
        match self {
            Self::MessageType(_) => option_codes::MESSAGE_TYPE,
            Self::RequestedIp(_) => option_codes::REQUESTED_IP,
            Self::ServerId(_) => option_codes::SERVER_ID,
            Self::LeaseTime(_) => option_codes::LEASE_TIME,
            Self::SubnetMask(_) => option_codes::SUBNET_MASK,
            Self::Router(_) => option_codes::ROUTER,
            Self::DomainNameServer(_) => option_codes::DOMAIN_NAME_SERVER,
            Self::DomainName(_) => option_codes::DOMAIN_NAME,
            Self::Hostname(_) => option_codes::HOSTNAME,
            Self::ClientId(_) => option_codes::CLIENT_ID,
            Self::VendorClassId(_) => option_codes::VENDOR_CLASS_ID,
            Self::End => option_codes::END,
            Self::Raw(code, _) => *code,
        }
    }

    /// Build an option from its wire code and payload.
    ///
    /// Never fails: a known code whose payload has the wrong shape comes
    /// back as `Raw` instead of being dropped.
    pub fn from_wire(code: u8, data: &[u8]) -> Self {
        match code {
            option_codes::MESSAGE_TYPE => {
                if data.len() == 1 {
                    if let Some(msg_type) = DhcpMessageType::from_u8(data[0]) {
                        return Self::MessageType(msg_type);
                    }
                }
                Self::Raw(code, data.to_vec())
            }

            option_codes::REQUESTED_IP => match parse_single_addr(data) {
                Some(addr) => Self::RequestedIp(addr),
                None => Self::Raw(code, data.to_vec()),
            },

            option_codes::SERVER_ID => match parse_single_addr(data) {
                Some(addr) => Self::ServerId(addr),
                None => Self::Raw(code, data.to_vec()),
            },

            option_codes::SUBNET_MASK => match parse_single_addr(data) {
                Some(addr) => Self::SubnetMask(addr),
                None => Self::Raw(code, data.to_vec()),
            },

            option_codes::LEASE_TIME => {
                if data.len() == 4 {
                    Self::LeaseTime(u32::from_be_bytes([data[0], data[1], data[2], data[3]]))
                } else {
                    Self::Raw(code, data.to_vec())
                }
            }

            option_codes::ROUTER => match parse_addr_list(data) {
                Some(addrs) => Self::Router(addrs),
                None => Self::Raw(code, data.to_vec()),
            },

            option_codes::DOMAIN_NAME_SERVER => match parse_addr_list(data) {
                Some(addrs) => Self::DomainNameServer(addrs),
                None => Self::Raw(code, data.to_vec()),
            },

            option_codes::DOMAIN_NAME => match String::from_utf8(data.to_vec()) {
                Ok(name) => Self::DomainName(name),
                Err(_) => Self::Raw(code, data.to_vec()),
            },

            option_codes::HOSTNAME => match String::from_utf8(data.to_vec()) {
                Ok(name) => Self::Hostname(name),
                Err(_) => Self::Raw(code, data.to_vec()),
            },

            option_codes::VENDOR_CLASS_ID => match String::from_utf8(data.to_vec()) {
                Ok(id) => Self::VendorClassId(id),
                Err(_) => Self::Raw(code, data.to_vec()),
            },

            option_codes::CLIENT_ID => Self::ClientId(data.to_vec()),

            option_codes::END => Self::End,

            _ => Self::Raw(code, data.to_vec()),
        }
    }

    /// Append the wire form (code, length, payload) to `out`.
    ///
    /// End is a bare marker byte and carries no length.
    pub fn encode(&self, out: &mut Vec<u8>) -> Result<(), BuildError> {
        if let Self::End = self {
            out.push(option_codes::END);
            return Ok(());
        }

        let data = self.wire_data();
        if data.len() > 255 {
            return Err(BuildError::OptionTooLong {
                code: self.code(),
                len: data.len(),
            });
        }

        out.push(self.code());
        out.push(data.len() as u8);
        out.extend_from_slice(&data);
        Ok(())
    }

    fn wire_data(&self) -> Vec<u8> {
        match self {
            Self::MessageType(msg_type) => vec![msg_type.as_u8()],
            Self::RequestedIp(addr) | Self::ServerId(addr) | Self::SubnetMask(addr) => {
                addr.octets().to_vec()
            }
            Self::LeaseTime(secs) => secs.to_be_bytes().to_vec(),
            Self::Router(addrs) | Self::DomainNameServer(addrs) => {
                addrs.iter().flat_map(|addr| addr.octets()).collect()
            }
            Self::DomainName(s) | Self::Hostname(s) | Self::VendorClassId(s) => {
                s.as_bytes().to_vec()
            }
            Self::ClientId(id) => id.clone(),
            Self::End => Vec::new(),
            Self::Raw(_, data) => data.clone(),
        }
    }
}

fn parse_single_addr(data: &[u8]) -> Option<Ipv4Addr> {
    if data.len() != 4 {
        return None;
    }
    Some(Ipv4Addr::new(data[0], data[1], data[2], data[3]))
}

fn parse_addr_list(data: &[u8]) -> Option<Vec<Ipv4Addr>> {
    if data.is_empty() || data.len() % 4 != 0 {
        return None;
    }
    Some(
        data.chunks_exact(4)
            .map(|chunk| Ipv4Addr::new(chunk[0], chunk[1], chunk[2], chunk[3]))
            .collect(),
    )
}

fn join_addrs(addrs: &[Ipv4Addr]) -> String {
    addrs
        .iter()
        .map(|addr| addr.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

impl fmt::Display for DhcpOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MessageType(msg_type) => write!(f, "MessageType({})", msg_type),
            Self::RequestedIp(addr) => write!(f, "RequestedIP({})", addr),
            Self::ServerId(addr) => write!(f, "ServerID({})", addr),
            Self::LeaseTime(secs) => write!(f, "LeaseTime({})", secs),
            Self::SubnetMask(addr) => write!(f, "SubnetMask({})", addr),
            Self::Router(addrs) => write!(f, "Router({})", join_addrs(addrs)),
            Self::DomainNameServer(addrs) => write!(f, "DNSServer({})", join_addrs(addrs)),
            Self::DomainName(name) => write!(f, "DomainName({})", name),
            Self::Hostname(name) => write!(f, "Hostname({})", name),
            Self::ClientId(id) => write!(f, "ClientID({})", format_mac(id)),
            Self::VendorClassId(id) => write!(f, "VendorClassID({})", id),
            Self::End => write!(f, "End"),
            Self::Raw(code, data) => {
                if data.is_empty() {
                    write!(f, "Option({})", code)
                } else {
                    write!(f, "Option({}:{})", code, format_mac(data))
                }
            }
        }
    }
}
