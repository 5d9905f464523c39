//! intip - DHCP diagnostic tool.
//!
//! Captures DHCP traffic on a network interface and prints one report
//! block per message. With --discover, broadcasts a DHCPDISCOVER probe
//! shortly after capture starts so servers on the segment reveal
//! themselves.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use macaddr::MacAddr6;
use tracing_subscriber::EnvFilter;

use intip::capture::{FrameSink, FrameSource};
use intip::error::CaptureError;
use intip::parser::decode_frame;
use intip::reporter::MessageReporter;
use intip::utils::{format_mac, hostname};
use intip::{ConsoleReporter, DiscoverBuilder, PnetCapture};

#[derive(Parser, Debug)]
#[command(name = "intip")]
#[command(about = "Watches DHCP traffic on an interface and can probe with DISCOVER")]
struct Args {
    /// Network interface to capture on (e.g., eth0); lists all interfaces if omitted
    #[arg(short, long)]
    interface: Option<String>,

    /// Send a DHCPDISCOVER probe one second after capture starts
    #[arg(short, long)]
    discover: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing();

    match args.interface {
        Some(ref name) => run(name, args.discover),
        None => {
            list_interfaces();
            Ok(())
        }
    }
}

fn list_interfaces() {
    println!("All available devices");
    for line in PnetCapture::list_interfaces() {
        println!("{}", line);
    }
    println!("\nRun with --help for usage.");
}

fn run(interface_name: &str, discover: bool) -> anyhow::Result<()> {
    let capture = PnetCapture::new(interface_name)
        .with_context(|| format!("Failed to open interface '{}'", interface_name))?;

    // Resolved before open() consumes the capture; only checked if a
    // probe is actually sent.
    let hardware_addr = capture.hardware_addr();

    let (mut source, sink) = capture.open().context("Failed to open capture channel")?;

    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = Arc::clone(&running);
    ctrlc::set_handler(move || {
        handler_flag.store(false, Ordering::SeqCst);
    })
    .context("Failed to install Ctrl+C handler")?;
    source.set_running(Arc::clone(&running));

    let probe = if discover {
        let hostname = hostname();
        let mut sink = sink;
        Some(thread::spawn(move || {
            thread::sleep(Duration::from_secs(1));
            send_discover_frame(&mut sink, hardware_addr, hostname);
        }))
    } else {
        None
    };

    let reporter = ConsoleReporter::new();
    reporter.on_start(source.interface_name());

    for frame in source.frames() {
        match decode_frame(&frame.data) {
            Ok(Some(message)) => reporter.report(&message),
            Ok(None) => {}
            Err(e) => tracing::warn!("Malformed DHCP packet: {}", e),
        }
    }

    reporter.on_stop();

    if let Some(handle) = probe {
        let _ = handle.join();
    }

    Ok(())
}

fn send_discover_frame(
    sink: &mut dyn FrameSink,
    hardware_addr: Result<MacAddr6, CaptureError>,
    hostname: Option<String>,
) {
    let addr = match hardware_addr {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!("Cannot send DISCOVER: {}", e);
            return;
        }
    };

    let mut builder = DiscoverBuilder::new(addr);
    if let Some(name) = hostname {
        builder = builder.with_hostname(name);
    }

    let frame = match builder.build() {
        Ok(frame) => frame,
        Err(e) => {
            tracing::error!(
                "Failed to build DISCOVER frame for {}: {}",
                format_mac(addr.as_bytes()),
                e
            );
            return;
        }
    };

    match sink.send_frame(&frame) {
        Ok(()) => tracing::debug!("Sent DHCPDISCOVER ({} bytes)", frame.len()),
        Err(e) => tracing::error!("Failed to send packet: {}", e),
    }
}
