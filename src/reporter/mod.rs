//! Reporting of decoded DHCP messages.

mod console_reporter;

pub use console_reporter::ConsoleReporter;

use crate::domain::DhcpMessage;

/// Destination for decoded DHCP messages.
///
/// Implementations only render and deliver; decoding and filtering happen
/// upstream.
pub trait MessageReporter: Send {
    /// Report one decoded DHCP message.
    fn report(&self, message: &DhcpMessage);

    /// Called when capture starts.
    fn on_start(&self, interface: &str);

    /// Called when capture stops.
    fn on_stop(&self);
}
