//! DHCP diagnostic library.
//!
//! Watches DHCP traffic on a network interface, decodes each message into
//! a structured form, and renders deterministic text reports. Can also
//! build and broadcast a DHCPDISCOVER probe to solicit replies from the
//! servers on the segment.

pub mod builder;
pub mod capture;
pub mod domain;
pub mod error;
pub mod parser;
pub mod reporter;
pub mod utils;

pub use builder::DiscoverBuilder;
pub use capture::{FrameSink, FrameSource, PnetCapture, RawFrame};
pub use domain::{DhcpMessage, DhcpMessageType, DhcpOption, Operation};
pub use error::{BuildError, CaptureError, DecodeError};
pub use parser::{decode_frame, parse_message};
pub use reporter::{ConsoleReporter, MessageReporter};
