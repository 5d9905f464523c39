//! Domain models for DHCP traffic.
//!
//! This module contains the core message and option types, independent of
//! capture and frame-assembly concerns.

mod dhcp;
pub mod options;

pub use dhcp::{
    DhcpMessage, DhcpMessageType, Operation, DHCP_MAGIC_COOKIE, FIXED_HEADER_LEN,
    HARDWARE_TYPE_ETHERNET,
};
pub use options::DhcpOption;
