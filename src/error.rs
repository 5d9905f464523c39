//! Error types for capture, decode, and frame building.

use thiserror::Error;

/// Errors from opening or using a capture/injection channel.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Interface '{0}' not found")]
    InterfaceNotFound(String),

    #[error("Insufficient permissions to open a capture channel. Try running as root or with CAP_NET_RAW.")]
    InsufficientPermissions,

    #[error("Failed to create datalink channel: {0}")]
    ChannelCreation(String),

    #[error("Interface '{0}' has no hardware address")]
    NoHardwareAddress(String),

    #[error("Failed to send frame: {0}")]
    Transmit(#[from] std::io::Error),
}

/// Errors from a structurally broken DHCP options region.
///
/// These are distinct from "not a DHCP packet": they only occur once the
/// payload has already passed the magic-cookie check.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Option {code} at offset {offset}: length byte missing")]
    OptionLengthMissing { code: u8, offset: usize },

    #[error("Option {code} at offset {offset}: declared {declared} bytes, only {remaining} remain")]
    OptionTruncated {
        code: u8,
        offset: usize,
        declared: usize,
        remaining: usize,
    },
}

/// Errors from serializing a DHCP message or assembling a frame.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Option {code} payload is {len} bytes, maximum is 255")]
    OptionTooLong { code: u8, len: usize },

    #[error("Frame of {0} bytes exceeds the IPv4 total length field")]
    FrameTooLarge(usize),

    #[error("Frame buffer too small for {0} header")]
    FrameAssembly(&'static str),
}
