//! DHCP frame and payload parsing.
//!
//! This module is responsible for turning raw bytes into domain DHCP types.

mod dhcp_parser;
mod frame_decoder;

pub use dhcp_parser::parse_message;
pub use frame_decoder::{decode_frame, DHCP_CLIENT_PORT, DHCP_SERVER_PORT};
