//! Link-layer frame capture and injection.

pub mod pnet_capture;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::error::CaptureError;

pub use pnet_capture::{PnetCapture, PnetFrameSink, PnetFrameSource};

/// One raw link-layer frame as read from the wire.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub data: Vec<u8>,
}

/// A source of raw frames from a network interface.
pub trait FrameSource: Send {
    /// Blocking iterator over captured frames. Ends once the running
    /// flag is cleared.
    fn frames(&mut self) -> Box<dyn Iterator<Item = RawFrame> + '_>;

    /// Name of the interface being captured.
    fn interface_name(&self) -> &str;

    /// Install the flag that stops the frame iterator.
    fn set_running(&mut self, running: Arc<AtomicBool>);
}

/// A sink that injects raw frames onto the wire.
pub trait FrameSink: Send {
    fn send_frame(&mut self, frame: &[u8]) -> Result<(), CaptureError>;
}
