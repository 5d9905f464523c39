//! Console-based message reporter.

use std::io::{self, Write};
use std::net::Ipv4Addr;

use crate::domain::DhcpMessage;
use crate::reporter::MessageReporter;
use crate::utils::format_mac;

/// Renders DHCP messages as multi-line text blocks on stdout.
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }

    /// Render one message as its report block.
    ///
    /// The layout is fixed: a summary line, one indented line per option
    /// in wire order, the non-zero header addresses, then the transaction
    /// id in decimal. A zero ciaddr still prints as 0.0.0.0 in the summary
    /// line; the other addresses are omitted entirely when zero.
    pub fn format_message(&self, message: &DhcpMessage) -> String {
        let mut output = String::new();

        let client_ip = message.ciaddr.unwrap_or(Ipv4Addr::UNSPECIFIED);
        output.push_str(&format!(
            "{} from {} / {}\n",
            message.operation,
            client_ip,
            format_mac(message.chaddr.as_bytes())
        ));

        for option in &message.options {
            output.push_str(&format!("  {}\n", option));
        }

        if let Some(addr) = message.yiaddr {
            output.push_str(&format!("  ClientIP({})\n", addr));
        }
        if let Some(addr) = message.siaddr {
            output.push_str(&format!("  ServerIP({})\n", addr));
        }
        if let Some(addr) = message.giaddr {
            output.push_str(&format!("  RelayAgentIP({})\n", addr));
        }

        output.push_str(&format!("  Xid({})\n", message.xid));

        output
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageReporter for ConsoleReporter {
    fn report(&self, message: &DhcpMessage) {
        let output = self.format_message(message);
        let mut stdout = io::stdout().lock();
        // writeln adds the blank separator line after the block
        let _ = writeln!(stdout, "{}", output);
    }

    fn on_start(&self, interface: &str) {
        println!("Watching DHCP traffic on interface: {}", interface);
        println!("Press Ctrl+C to stop.\n");
    }

    fn on_stop(&self) {
        println!("\nStopping DHCP capture.");
    }
}
