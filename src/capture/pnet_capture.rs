//! pnet-based capture and injection.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use macaddr::MacAddr6;
use pnet::datalink::{self, Channel, Config, DataLinkReceiver, DataLinkSender, NetworkInterface};
use pnet::util::MacAddr;

use super::{FrameSink, FrameSource, RawFrame};
use crate::error::CaptureError;

/// Frame capture bound to one network interface, using the pnet library.
pub struct PnetCapture {
    interface: NetworkInterface,
}

impl PnetCapture {
    /// Bind to the named interface.
    pub fn new(interface_name: &str) -> Result<Self, CaptureError> {
        let interface = datalink::interfaces()
            .into_iter()
            .find(|iface| iface.name == interface_name)
            .ok_or_else(|| CaptureError::InterfaceNotFound(interface_name.to_string()))?;

        Ok(Self { interface })
    }

    pub fn interface_name(&self) -> &str {
        &self.interface.name
    }

    /// Hardware address of the bound interface, if it has a usable one.
    pub fn hardware_addr(&self) -> Result<MacAddr6, CaptureError> {
        self.interface
            .mac
            .filter(|mac| *mac != MacAddr::zero())
            .map(|mac| {
                let octets = mac.octets();
                MacAddr6::new(
                    octets[0], octets[1], octets[2], octets[3], octets[4], octets[5],
                )
            })
            .ok_or_else(|| CaptureError::NoHardwareAddress(self.interface.name.clone()))
    }

    /// Open the capture channel, returning its receive and transmit halves.
    ///
    /// The receive half uses a short read timeout so the frame iterator can
    /// poll its running flag between reads.
    pub fn open(self) -> Result<(PnetFrameSource, PnetFrameSink), CaptureError> {
        let config = Config {
            read_timeout: Some(Duration::from_millis(100)),
            promiscuous: true,
            ..Config::default()
        };

        let (tx, rx) = match datalink::channel(&self.interface, config) {
            Ok(Channel::Ethernet(tx, rx)) => (tx, rx),
            Ok(_) => {
                return Err(CaptureError::ChannelCreation(
                    "unsupported channel type".to_string(),
                ))
            }
            Err(e) => {
                let msg = e.to_string();
                if msg.contains("permission") || msg.contains("Operation not permitted") {
                    return Err(CaptureError::InsufficientPermissions);
                }
                return Err(CaptureError::ChannelCreation(msg));
            }
        };

        let source = PnetFrameSource {
            interface_name: self.interface.name.clone(),
            rx,
            running: Arc::new(AtomicBool::new(true)),
        };

        Ok((source, PnetFrameSink { tx }))
    }

    /// One line per known interface: name, MAC, bound addresses (or
    /// `<none>`), and flags.
    pub fn list_interfaces() -> Vec<String> {
        datalink::interfaces()
            .into_iter()
            .map(|iface| {
                let mac = iface.mac.map(|mac| mac.to_string()).unwrap_or_default();
                let addrs: Vec<String> = iface.ips.iter().map(|ip| ip.to_string()).collect();
                let bound = if addrs.is_empty() {
                    "<none>".to_string()
                } else {
                    addrs.join(",")
                };
                format!(
                    "{:<20}{:<20} : {} {}",
                    iface.name,
                    mac,
                    bound,
                    interface_flags(&iface)
                )
            })
            .collect()
    }
}

fn interface_flags(interface: &NetworkInterface) -> String {
    let mut flags = Vec::new();
    if interface.is_up() {
        flags.push("up");
    }
    if interface.is_broadcast() {
        flags.push("broadcast");
    }
    if interface.is_loopback() {
        flags.push("loopback");
    }
    if interface.is_point_to_point() {
        flags.push("pointtopoint");
    }
    if interface.is_multicast() {
        flags.push("multicast");
    }

    if flags.is_empty() {
        "0".to_string()
    } else {
        flags.join("|")
    }
}

/// Receive half of an open capture channel.
pub struct PnetFrameSource {
    interface_name: String,
    rx: Box<dyn DataLinkReceiver>,
    running: Arc<AtomicBool>,
}

impl FrameSource for PnetFrameSource {
    fn frames(&mut self) -> Box<dyn Iterator<Item = RawFrame> + '_> {
        Box::new(FrameIterator {
            rx: &mut self.rx,
            running: Arc::clone(&self.running),
        })
    }

    fn interface_name(&self) -> &str {
        &self.interface_name
    }

    fn set_running(&mut self, running: Arc<AtomicBool>) {
        self.running = running;
    }
}

/// Blocking iterator over captured frames.
///
/// The channel's read timeout bounds how long a stale running flag keeps
/// the iterator alive.
struct FrameIterator<'a> {
    rx: &'a mut Box<dyn DataLinkReceiver>,
    running: Arc<AtomicBool>,
}

impl Iterator for FrameIterator<'_> {
    type Item = RawFrame;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if !self.running.load(Ordering::SeqCst) {
                return None;
            }

            match self.rx.next() {
                Ok(frame) => {
                    return Some(RawFrame {
                        data: frame.to_vec(),
                    })
                }
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => continue,
                Err(e) => {
                    tracing::debug!("Capture read error: {}", e);
                    continue;
                }
            }
        }
    }
}

/// Transmit half of an open capture channel.
pub struct PnetFrameSink {
    tx: Box<dyn DataLinkSender>,
}

impl FrameSink for PnetFrameSink {
    fn send_frame(&mut self, frame: &[u8]) -> Result<(), CaptureError> {
        match self.tx.send_to(frame, None) {
            Some(Ok(())) => Ok(()),
            Some(Err(e)) => Err(CaptureError::Transmit(e)),
            None => Err(CaptureError::Transmit(std::io::Error::new(
                std::io::ErrorKind::Other,
                "channel rejected frame",
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_interface_is_reported_by_name() {
        match PnetCapture::new("does-not-exist0") {
            Err(CaptureError::InterfaceNotFound(name)) => assert_eq!(name, "does-not-exist0"),
            Err(other) => panic!("expected InterfaceNotFound, got {:?}", other),
            Ok(_) => panic!("expected InterfaceNotFound, got a capture"),
        }
    }
}
