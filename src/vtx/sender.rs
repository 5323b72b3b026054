//! # Redundant Command Sender
//!
//! Dedicated task owning the VTX serial line. The tuner enqueues a built
//! frame; this task performs the redundant writes with their inter-write
//! spacing so the receiver polling loop never blocks on VTX timing.
//!
//! The link is fire-and-forget: the module sends no acknowledgment, so the
//! repeated send is the only delivery mitigation. A write failure abandons
//! the frame; there is no retry beyond the fixed redundancy.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::command::VtxCommandFrame;
use crate::serial::port_trait::SerialSink;

/// Task that drains queued command frames onto the serial line.
pub struct CommandSender<P: SerialSink> {
    port: P,
    commands: mpsc::Receiver<VtxCommandFrame>,
    resend_count: u32,
    resend_spacing: Duration,
}

impl<P: SerialSink> CommandSender<P> {
    /// Creates a sender draining `commands` onto `port`.
    ///
    /// # Arguments
    ///
    /// * `port` - The VTX serial line
    /// * `commands` - Queue fed by [`VtxTuner`](super::tuner::VtxTuner)
    /// * `resend_count` - How many times each frame is written
    /// * `resend_spacing` - Delay between consecutive writes of one frame
    pub fn new(
        port: P,
        commands: mpsc::Receiver<VtxCommandFrame>,
        resend_count: u32,
        resend_spacing: Duration,
    ) -> Self {
        Self {
            port,
            commands,
            resend_count,
            resend_spacing,
        }
    }

    /// Runs until the command queue closes.
    pub async fn run(mut self) {
        while let Some(frame) = self.commands.recv().await {
            self.send_redundant(&frame).await;
        }

        debug!("Command queue closed, sender task exiting");
    }

    /// Writes one frame `resend_count` times with `resend_spacing` between
    /// writes. Abandons the frame on the first failed write.
    async fn send_redundant(&mut self, frame: &VtxCommandFrame) {
        for attempt in 0..self.resend_count {
            if attempt > 0 {
                sleep(self.resend_spacing).await;
            }

            if let Err(e) = self.write_once(frame).await {
                warn!(
                    "Failed to write VTX command (send {}/{}): {}",
                    attempt + 1,
                    self.resend_count,
                    e
                );
                return;
            }
        }

        debug!(
            "VTX command {:02X?} written {} times",
            frame, self.resend_count
        );
    }

    async fn write_once(&mut self, frame: &VtxCommandFrame) -> std::io::Result<()> {
        self.port.write_all(frame).await?;
        self.port.flush().await
    }
}
