use crate::context::{Context, ContextError};
use crate::craft::ProfileError;
use crate::net::buffer::CaptureBuffer;
use crate::net::flow::Flows;
use crate::net::interface;
use crate::net::interface::InterfaceError;
use clap::builder::RangedU64ValueParser;
use clap::{Parser, Subcommand};
use crossbeam::channel::RecvTimeoutError;
use dpi::display;
use dpi::dto::frame::{CapturedFrame, Direction, FrameHeader};
use dpi::parser::FrameDecoder;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const REPORTED_FLOWS: usize = 5;
const PREVIEW_BYTES: usize = 16;

/// Packet capture, decoding and crafting
#[derive(Parser, Debug)]
#[command(name = "inspector", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// List usable capture devices
    Devices,

    /// Capture until Ctrl-C
    Capture,

    /// Build a frame and print its bytes
    Build {
        /// Craft profile in TOML
        profile: PathBuf,
    },

    /// Build a frame and send it
    Send {
        /// Craft profile in TOML
        profile: PathBuf,

        /// How many times the frame is sent
        #[arg(default_value_t = 1, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
        count: usize,
    },
}

impl Command {
    pub fn execute(self, context: &mut Context) -> Result<(), CommandError> {
        match self {
            Command::Devices => list_devices(),
            Command::Capture => capture(context),
            Command::Build { profile } => build(&profile),
            Command::Send { profile, count } => {
                let config = crate::craft::load_profile(&profile)?;
                context.send(&config, count)?;
                Ok(())
            },
        }
    }
}

fn list_devices() -> Result<(), CommandError> {
    let devices = interface::usable_sorted()?;
    if devices.is_empty() {
        println!("No usable devices.");
    }

    for device in devices {
        let addresses: Vec<String> = device
            .addresses
            .iter()
            .map(|address| address.addr.to_string())
            .collect();
        println!(
            "{}\t{}\t{}",
            device.name,
            device.desc.as_deref().unwrap_or("-"),
            addresses.join(", ")
        );
    }

    Ok(())
}

fn build(profile: &Path) -> Result<(), CommandError> {
    let config = crate::craft::load_profile(profile)?;
    let bytes = dpi::craft::craft(&config).map_err(ProfileError::Craft)?;

    let header = FrameHeader {
        caplen: bytes.len() as u32,
        len: bytes.len() as u32,
        ..Default::default()
    };
    let frame = FrameDecoder::new(bytes.len()).decode(&bytes, &header);
    println!("{} bytes, {}", bytes.len(), summary(&frame));
    for line in display::hex_dump(&bytes, display::DEFAULT_BYTES_PER_LINE) {
        println!("{}", line);
    }

    Ok(())
}

fn capture(context: &mut Context) -> Result<(), CommandError> {
    let (stop_tx, stop_rx) = crossbeam::channel::bounded::<()>(1);
    ctrlc::set_handler(move || {
        let _ = stop_tx.try_send(());
    })
    .map_err(CommandError::SignalHandler)?;

    context.start_capture()?;
    log::info!("Press Ctrl-C to stop.");

    let buffer = context.buffer();
    let poll_interval = Duration::from_millis(context.config.poll_interval_ms);
    loop {
        match stop_rx.recv_timeout(poll_interval) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                report(&buffer);
                if !context.is_capturing() {
                    log::warn!("Capture thread ended.");
                    break;
                }
            },
        }
    }

    context.stop_capture();
    report(&buffer);

    Ok(())
}

fn report(buffer: &CaptureBuffer) {
    let inbound = buffer.group_by(Direction::Inbound);
    let outbound = buffer.group_by(Direction::Outbound);

    let history = if buffer.is_history_enabled() {
        format!("{} in history", buffer.history_count())
    } else {
        "history off".to_string()
    };
    log::info!(
        "Frames: {} recent, {}{}. Flows: {} inbound, {} outbound.",
        buffer.recent_count(),
        history,
        if buffer.is_dumping() { ", dumping" } else { "" },
        inbound.len(),
        outbound.len()
    );
    for (key, frames) in busiest(&inbound) {
        log::info!("  <- {} ({} frames)", key, frames);
    }
    for (key, frames) in busiest(&outbound) {
        log::info!("  -> {} ({} frames)", key, frames);
    }

    if let Some(frame) = buffer.latest() {
        log::info!(
            "Latest: {} {} | {}",
            frame.time_string(),
            summary(&frame),
            frame.hex_preview(PREVIEW_BYTES)
        );
        for line in frame.hex_dump() {
            log::debug!("{}", line);
        }
    }
}

fn busiest(flows: &Flows) -> Vec<(String, usize)> {
    let mut sizes: Vec<(String, usize)> = flows
        .iter()
        .map(|(key, frames)| (key.to_string(), frames.len()))
        .collect();
    sizes.sort_by(|left, right| right.1.cmp(&left.1));
    sizes.truncate(REPORTED_FLOWS);
    sizes
}

fn summary(frame: &CapturedFrame) -> String {
    let endpoint = |address: Option<std::net::Ipv4Addr>, port: u16| match address {
        Some(address) if port != 0 => format!("{}:{}", address, port),
        Some(address) => address.to_string(),
        None => "-".to_string(),
    };

    let direction = if frame.is_inbound() { "in" } else { "out" };
    format!(
        "{} {} {} -> {} ttl {} len {} ({})",
        frame.ether_type_label(),
        frame.transport_label(),
        endpoint(frame.source_address(), frame.source_port()),
        endpoint(frame.destination_address(), frame.destination_port()),
        frame.time_to_live(),
        frame.wire_length(),
        direction
    )
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Failed to set Ctrl-C handler.")]
    SignalHandler(ctrlc::Error),

    #[error("{0}")]
    Context(#[from] ContextError),

    #[error("{0}")]
    Interface(#[from] InterfaceError),

    #[error("{0}")]
    Profile(#[from] ProfileError),
}

impl CommandError {
    pub fn additional_info(&self) -> Option<String> {
        match self {
            CommandError::SignalHandler(err) => Some(err.to_string()),
            CommandError::Context(err) => err.additional_info(),
            CommandError::Interface(err) => err.additional_info(),
            CommandError::Profile(err) => err.additional_info(),
            _ => None,
        }
    }
}
