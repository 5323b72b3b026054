//! # VTX Bridge
//!
//! Retune a SteadyView X VTX receiver module from an ExpressLRS aux channel.
//!
//! This application listens to the CRSF frame stream of an RC receiver,
//! watches the 12th channel (AUX8), and retunes the SteadyView X module
//! whenever the selected video frequency changes.

use anyhow::Result;
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use vtx_bridge::bridge::{Bridge, FREQUENCY_SELECTOR_CHANNEL};
use vtx_bridge::config::Config;
use vtx_bridge::crsf::decoder::{decode_rc_channels, FrameBuffer};
use vtx_bridge::crsf::protocol::CRSF_FRAMETYPE_RC_CHANNELS_PACKED;
use vtx_bridge::serial::SerialLink;
use vtx_bridge::vtx::sender::CommandSender;
use vtx_bridge::vtx::table::FrequencyTable;
use vtx_bridge::vtx::tuner::VtxTuner;

/// Config file consulted when no path is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Command frames buffered between tuner and sender task
const COMMAND_QUEUE_DEPTH: usize = 8;

/// Serial read chunk; comfortably larger than the 26-byte RC frame
const READ_CHUNK_SIZE: usize = 64;

/// Number of RC frames between status log messages
const LOG_INTERVAL_FRAMES: u64 = 1000;

/// Main entry point for VTX Bridge
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load configuration (optional path argument, else
///      `config/default.toml`, else compiled-in defaults)
///    - Build the frequency table (fails fast if the band data is bad)
///    - Open the receiver and VTX serial ports
///    - Spawn the dedicated command sender task
///
/// 2. **Main Loop**
///    - Accumulate receiver bytes, extract CRSF frames
///    - For each valid RC channels frame, evaluate the selector channel
///      through the rate gate, policy and tuner
///    - Handle Ctrl+C for shutdown
///
/// The redundant VTX writes happen on the sender task, so frame intake is
/// never stalled by retune timing.
///
/// # Errors
///
/// Returns error if a serial port cannot be opened, the configuration is
/// invalid, or the sender task dies while commands are pending.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("VTX Bridge v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(DEFAULT_CONFIG_PATH)?,
    };

    let table = FrequencyTable::steadyview_x()?;
    info!("Frequency table ready: {} supported frequencies", table.len());

    let receiver = SerialLink::open("receiver", &config.receiver.port, config.receiver.baud_rate)?;
    let vtx = SerialLink::open("vtx", &config.vtx.port, config.vtx.baud_rate)?;

    let (commands_tx, commands_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
    let sender = CommandSender::new(
        vtx.into_inner(),
        commands_rx,
        config.tuner.resend_count,
        Duration::from_millis(config.tuner.resend_spacing_ms),
    );
    tokio::spawn(sender.run());

    let tuner = VtxTuner::new(table, commands_tx);
    let mut bridge = Bridge::new(tuner, Duration::from_millis(config.tuner.update_interval_ms));

    let mut port = receiver.into_inner();
    let mut frames = FrameBuffer::new();
    let mut read_buf = [0u8; READ_CHUNK_SIZE];
    let mut frame_count: u64 = 0;
    let mut retune_count: u64 = 0;

    info!(
        "Listening for RC frames; channel {} selects the video frequency",
        FREQUENCY_SELECTOR_CHANNEL + 1
    );
    info!("Press Ctrl+C to exit");

    // Main control loop
    loop {
        tokio::select! {
            result = port.read(&mut read_buf) => {
                match result {
                    Ok(0) => {
                        warn!("Receiver port returned EOF, shutting down");
                        break;
                    }
                    Ok(n) => {
                        frames.extend(&read_buf[..n]);

                        while let Some(frame_result) = frames.next_frame() {
                            let frame = match frame_result {
                                Ok(frame) => frame,
                                Err(e) => {
                                    debug!("Dropping invalid frame: {}", e);
                                    continue;
                                }
                            };

                            if frame.frame_type != CRSF_FRAMETYPE_RC_CHANNELS_PACKED {
                                trace!("Ignoring frame type 0x{:02X}", frame.frame_type);
                                continue;
                            }

                            // A frame that does not decode is skipped whole;
                            // never act on partial channel data
                            let channels = match decode_rc_channels(&frame.payload) {
                                Ok(channels) => channels,
                                Err(e) => {
                                    debug!("Skipping undecodable RC frame: {}", e);
                                    continue;
                                }
                            };

                            frame_count += 1;

                            if bridge.handle_channels(&channels, Instant::now()).await? {
                                retune_count += 1;
                            }

                            if frame_count % LOG_INTERVAL_FRAMES == 0 {
                                info!(
                                    "Processed {} RC frames, {} retunes sent",
                                    frame_count, retune_count
                                );
                            }
                        }
                    }
                    Err(e) => {
                        warn!("Receiver read failed: {}", e);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                    }
                }
            }

            // Handle Ctrl+C for shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    info!(
        "Total RC frames processed: {}, retunes sent: {}",
        frame_count, retune_count
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_chunk_covers_a_full_frame() {
        // A complete RC channels frame is 26 bytes; one read should always
        // be able to hold one
        assert!(READ_CHUNK_SIZE >= 26);
    }

    #[test]
    fn test_command_queue_depth() {
        // Retunes are rate-gated to at most ~2 per second, so a small queue
        // never fills in practice
        assert!(COMMAND_QUEUE_DEPTH >= 1);
    }

    #[test]
    fn test_log_interval_constant() {
        assert_eq!(LOG_INTERVAL_FRAMES, 1000);
    }
}
